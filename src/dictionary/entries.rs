//! Built-in attribute table
//!
//! Covers the attributes the confidentiality profile inspects, the structural
//! attributes needed to build test and interchange records, and a selection of
//! retired attributes. Sorted by tag.

use super::DictEntry;
use crate::domain::{Tag, Vr};

const fn entry(group: u16, element: u16, vr: Vr, keyword: &'static str) -> DictEntry {
    DictEntry {
        tag: Tag::new(group, element),
        vr,
        keyword,
        retired: false,
    }
}

const fn retired(group: u16, element: u16, vr: Vr, keyword: &'static str) -> DictEntry {
    DictEntry {
        tag: Tag::new(group, element),
        vr,
        keyword,
        retired: true,
    }
}

pub(super) static ENTRIES: &[DictEntry] = &[
    entry(0x0002, 0x0010, Vr::UI, "TransferSyntaxUID"),
    retired(0x0008, 0x0010, Vr::SH, "RecognitionCode"),
    entry(0x0008, 0x0014, Vr::UI, "InstanceCreatorUID"),
    entry(0x0008, 0x0016, Vr::UI, "SOPClassUID"),
    entry(0x0008, 0x0018, Vr::UI, "SOPInstanceUID"),
    entry(0x0008, 0x0020, Vr::DA, "StudyDate"),
    entry(0x0008, 0x0030, Vr::TM, "StudyTime"),
    retired(0x0008, 0x0040, Vr::US, "DataSetType"),
    retired(0x0008, 0x0041, Vr::LO, "DataSetSubtype"),
    entry(0x0008, 0x0050, Vr::SH, "AccessionNumber"),
    entry(0x0008, 0x0060, Vr::CS, "Modality"),
    entry(0x0008, 0x0080, Vr::LO, "InstitutionName"),
    entry(0x0008, 0x0081, Vr::ST, "InstitutionAddress"),
    entry(0x0008, 0x0090, Vr::PN, "ReferringPhysicianName"),
    entry(0x0008, 0x0092, Vr::ST, "ReferringPhysicianAddress"),
    entry(0x0008, 0x0094, Vr::SH, "ReferringPhysicianTelephoneNumbers"),
    retired(0x0008, 0x1000, Vr::AE, "NetworkID"),
    entry(0x0008, 0x1010, Vr::SH, "StationName"),
    entry(0x0008, 0x1030, Vr::LO, "StudyDescription"),
    entry(0x0008, 0x103E, Vr::LO, "SeriesDescription"),
    entry(0x0008, 0x1040, Vr::LO, "InstitutionalDepartmentName"),
    entry(0x0008, 0x1048, Vr::PN, "PhysiciansOfRecord"),
    entry(0x0008, 0x1050, Vr::PN, "PerformingPhysicianName"),
    entry(0x0008, 0x1060, Vr::PN, "NameOfPhysiciansReadingStudy"),
    entry(0x0008, 0x1070, Vr::PN, "OperatorsName"),
    entry(0x0008, 0x1080, Vr::LO, "AdmittingDiagnosesDescription"),
    entry(0x0008, 0x1110, Vr::SQ, "ReferencedStudySequence"),
    entry(0x0008, 0x1115, Vr::SQ, "ReferencedSeriesSequence"),
    entry(0x0008, 0x1120, Vr::SQ, "ReferencedPatientSequence"),
    entry(0x0008, 0x114A, Vr::SQ, "ReferencedInstanceSequence"),
    entry(0x0008, 0x1150, Vr::UI, "ReferencedSOPClassUID"),
    entry(0x0008, 0x1155, Vr::UI, "ReferencedSOPInstanceUID"),
    entry(0x0008, 0x2111, Vr::ST, "DerivationDescription"),
    entry(0x0010, 0x0010, Vr::PN, "PatientName"),
    entry(0x0010, 0x0020, Vr::LO, "PatientID"),
    entry(0x0010, 0x0030, Vr::DA, "PatientBirthDate"),
    entry(0x0010, 0x0032, Vr::TM, "PatientBirthTime"),
    entry(0x0010, 0x0040, Vr::CS, "PatientSex"),
    entry(0x0010, 0x1000, Vr::LO, "OtherPatientIDs"),
    entry(0x0010, 0x1001, Vr::PN, "OtherPatientNames"),
    entry(0x0010, 0x1010, Vr::AS, "PatientAge"),
    entry(0x0010, 0x1020, Vr::DS, "PatientSize"),
    entry(0x0010, 0x1030, Vr::DS, "PatientWeight"),
    retired(0x0010, 0x1050, Vr::LO, "InsurancePlanIdentification"),
    entry(0x0010, 0x1090, Vr::LO, "MedicalRecordLocator"),
    entry(0x0010, 0x2160, Vr::SH, "EthnicGroup"),
    entry(0x0010, 0x2180, Vr::SH, "Occupation"),
    entry(0x0010, 0x21B0, Vr::LT, "AdditionalPatientHistory"),
    entry(0x0010, 0x4000, Vr::LT, "PatientComments"),
    entry(0x0018, 0x1000, Vr::LO, "DeviceSerialNumber"),
    entry(0x0018, 0x1030, Vr::LO, "ProtocolName"),
    entry(0x0020, 0x000D, Vr::UI, "StudyInstanceUID"),
    entry(0x0020, 0x000E, Vr::UI, "SeriesInstanceUID"),
    entry(0x0020, 0x0010, Vr::SH, "StudyID"),
    retired(0x0020, 0x0030, Vr::DS, "ImagePosition"),
    retired(0x0020, 0x0035, Vr::DS, "ImageOrientation"),
    entry(0x0020, 0x0052, Vr::UI, "FrameOfReferenceUID"),
    retired(0x0020, 0x0070, Vr::LO, "ImageGeometryType"),
    entry(0x0020, 0x0200, Vr::UI, "SynchronizationFrameOfReferenceUID"),
    entry(0x0020, 0x4000, Vr::LT, "ImageComments"),
    retired(0x0028, 0x0005, Vr::US, "ImageDimensions"),
    entry(0x0028, 0x0010, Vr::US, "Rows"),
    entry(0x0028, 0x0011, Vr::US, "Columns"),
    entry(0x0040, 0x0275, Vr::SQ, "RequestAttributesSequence"),
    entry(0x0040, 0xA124, Vr::UI, "UID"),
    entry(0x0040, 0xA730, Vr::SQ, "ContentSequence"),
    entry(0x0088, 0x0140, Vr::UI, "StorageMediaFileSetUID"),
    entry(0x3006, 0x0024, Vr::UI, "ReferencedFrameOfReferenceUID"),
    entry(0x3006, 0x00C2, Vr::UI, "RelatedFrameOfReferenceUID"),
    retired(0x4008, 0x0042, Vr::LO, "ResultsIDIssuer"),
    entry(0x7FE0, 0x0010, Vr::OW, "PixelData"),
];
