//! Integration tests for the confidentiality profile over whole record sets

use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use veil::anonymization::audit::AuditLogger;
use veil::anonymization::{
    Action, Anonymizer, InMemoryStore, OptionalPolicy, ProfileConfig, StoreKey,
};
use veil::cli::commands::deidentify::DeidentifyArgs;
use veil::config::secret_string;
use veil::domain::{Element, Record, Tag, TreePath, Vr};

const PATIENT_NAME: Tag = Tag::new(0x0010, 0x0010);
const PATIENT_ID: Tag = Tag::new(0x0010, 0x0020);
const STUDY_UID: Tag = Tag::new(0x0020, 0x000D);
const SERIES_UID: Tag = Tag::new(0x0020, 0x000E);
const INSTITUTION: Tag = Tag::new(0x0008, 0x0080);
const REFERENCED_SERIES: Tag = Tag::new(0x0008, 0x1115);
const REFERENCED_INSTANCE_UID: Tag = Tag::new(0x0008, 0x1155);
const MODALITY: Tag = Tag::new(0x0008, 0x0060);

fn text(tag: Tag, vr: Vr, value: &str) -> Element {
    Element::text(tag, vr, value).unwrap()
}

fn instance(study_uid: &str, referenced: &[&str]) -> Record {
    let items = referenced
        .iter()
        .map(|uid| Record::new().with(text(REFERENCED_INSTANCE_UID, Vr::UI, uid)))
        .collect();
    Record::new()
        .with(text(PATIENT_NAME, Vr::PN, "DOE^JANE"))
        .with(text(PATIENT_ID, Vr::LO, "MRN-0042"))
        .with(text(STUDY_UID, Vr::UI, study_uid))
        .with(text(SERIES_UID, Vr::UI, "1.2.840.99.2"))
        .with(text(INSTITUTION, Vr::LO, "St. Elsewhere"))
        .with(text(MODALITY, Vr::CS, "CT"))
        .with(Element::sequence(REFERENCED_SERIES, items))
}

fn value(record: &Record, tag: Tag) -> Option<String> {
    record.get(tag).and_then(|e| e.as_text()).map(str::to_string)
}

#[test]
fn test_profile_protects_root_and_nested_fields() {
    let mut anonymizer = Anonymizer::with_defaults().unwrap();
    anonymizer.set_target(instance("1.2.840.99.1", &["1.2.840.99.3", "1.2.840.99.4"]));

    let report = anonymizer.run_confidentiality_profile(true).unwrap();
    let record = anonymizer.take_target().unwrap();

    assert_eq!(report.records_visited, 3);
    assert_eq!(value(&record, PATIENT_NAME).as_deref(), Some(""));
    assert_eq!(value(&record, PATIENT_ID).as_deref(), Some(""));
    assert!(value(&record, STUDY_UID).unwrap().starts_with("2.25."));
    assert!(record.get(INSTITUTION).is_none());
    assert_eq!(value(&record, MODALITY).as_deref(), Some("CT"));

    let items = record.get(REFERENCED_SERIES).unwrap().items().unwrap();
    let nested: Vec<String> = items
        .iter()
        .map(|item| value(item, REFERENCED_INSTANCE_UID).unwrap())
        .collect();
    assert!(nested.iter().all(|uid| uid.starts_with("2.25.")));
    assert_ne!(nested[0], nested[1]);
}

#[test]
fn test_pseudonyms_consistent_across_records_in_one_session() {
    let mut anonymizer = Anonymizer::with_defaults().unwrap();

    anonymizer.set_target(instance("1.2.840.99.1", &["1.2.840.99.7"]));
    anonymizer.run_confidentiality_profile(true).unwrap();
    let first = anonymizer.take_target().unwrap();

    // Second record references the first one's study UID from inside a sequence
    anonymizer.set_target(instance("1.2.840.99.5", &["1.2.840.99.1"]));
    anonymizer.run_confidentiality_profile(true).unwrap();
    let second = anonymizer.take_target().unwrap();

    let first_study = value(&first, STUDY_UID).unwrap();
    let reference = second.get(REFERENCED_SERIES).unwrap().items().unwrap()[0]
        .get(REFERENCED_INSTANCE_UID)
        .and_then(|e| e.as_text())
        .unwrap()
        .to_string();
    assert_eq!(first_study, reference);
    assert_eq!(value(&first, SERIES_UID), value(&second, SERIES_UID));
}

#[test]
fn test_salt_changes_pseudonyms() {
    let config = ProfileConfig {
        salt: Some(secret_string("site-secret".to_string())),
        ..ProfileConfig::default()
    };
    let mut salted = Anonymizer::from_config(&config).unwrap();
    let mut plain = Anonymizer::with_defaults().unwrap();

    salted.set_target(instance("1.2.840.99.1", &[]));
    plain.set_target(instance("1.2.840.99.1", &[]));
    salted.run_confidentiality_profile(true).unwrap();
    plain.run_confidentiality_profile(true).unwrap();

    let salted_uid = value(salted.target().unwrap(), STUDY_UID).unwrap();
    let plain_uid = value(plain.target().unwrap(), STUDY_UID).unwrap();
    assert!(salted_uid.starts_with("2.25."));
    assert_ne!(salted_uid, plain_uid);
}

#[test]
fn test_round_trip_through_store() {
    let original = instance("1.2.840.99.1", &["1.2.840.99.3", "1.2.840.99.4"]);
    let expected = serde_json::to_value(&original).unwrap();

    let mut anonymizer = Anonymizer::with_defaults().unwrap();
    anonymizer.attach_store(Box::new(InMemoryStore::new()));
    anonymizer.set_target(original);

    let forward = anonymizer.run_confidentiality_profile(true).unwrap();
    assert!(forward.fields_changed() > 0);

    let nested_key = StoreKey::new(
        anonymizer.record_id().unwrap(),
        REFERENCED_INSTANCE_UID,
        TreePath::root().child(REFERENCED_SERIES, 1),
    );
    let recovered = anonymizer.recover(&nested_key).unwrap().unwrap();
    assert_eq!(recovered.as_text(), Some("1.2.840.99.4"));

    let back = anonymizer.run_confidentiality_profile(false).unwrap();
    assert_eq!(back.restored, forward.fields_changed());

    let restored = anonymizer.take_target().unwrap();
    assert_eq!(serde_json::to_value(&restored).unwrap(), expected);
}

#[test]
fn test_records_sharing_a_store_restore_their_own_originals() {
    let patient = |sop_uid: &str, name: &str, institution: Option<&str>| {
        let record = Record::new()
            .with(text(Tag::SOP_INSTANCE_UID, Vr::UI, sop_uid))
            .with(text(PATIENT_NAME, Vr::PN, name))
            .with(text(STUDY_UID, Vr::UI, "1.2.840.99.1"));
        match institution {
            Some(institution) => record.with(text(INSTITUTION, Vr::LO, institution)),
            None => record,
        }
    };
    let originals = [
        patient("1.2.840.99.10", "DOE^JOHN", Some("General Hospital")),
        patient("1.2.840.99.11", "SMITH^JANE", None),
        patient("1.2.840.99.12", "ROE^RICHARD", Some("St. Elsewhere")),
    ];

    let mut anonymizer = Anonymizer::with_defaults().unwrap();
    anonymizer.attach_store(Box::new(InMemoryStore::new()));

    let mut protected = Vec::new();
    for original in &originals {
        anonymizer.set_target(original.clone());
        anonymizer.run_confidentiality_profile(true).unwrap();
        protected.push(anonymizer.take_target().unwrap());
    }
    assert!(protected.iter().all(|record| !record.contains(INSTITUTION)));

    // Restore in reverse so no record benefits from being last written
    for (record, original) in protected.into_iter().zip(&originals).rev() {
        anonymizer.set_target(record);
        anonymizer.run_confidentiality_profile(false).unwrap();
        let restored = anonymizer.take_target().unwrap();
        assert_eq!(
            serde_json::to_value(&restored).unwrap(),
            serde_json::to_value(original).unwrap()
        );
    }
}

#[test]
fn test_second_pass_changes_nothing() {
    let mut anonymizer = Anonymizer::with_defaults()
        .unwrap()
        .with_optional_policy(OptionalPolicy::Empty);
    anonymizer.attach_store(Box::new(InMemoryStore::new()));
    anonymizer.set_target(instance("1.2.840.99.1", &["1.2.840.99.3"]));

    anonymizer.run_confidentiality_profile(true).unwrap();
    let after_first = serde_json::to_value(anonymizer.target().unwrap()).unwrap();

    let second = anonymizer.run_confidentiality_profile(true).unwrap();
    assert_eq!(second.fields_changed(), 0);
    assert_eq!(
        serde_json::to_value(anonymizer.target().unwrap()).unwrap(),
        after_first
    );
}

#[test]
fn test_observer_sees_every_mutation() {
    let actions = Rc::new(RefCell::new(Vec::new()));
    let mut anonymizer = Anonymizer::with_defaults().unwrap();
    let sink = Rc::clone(&actions);
    anonymizer.subscribe(move |event| {
        let veil::anonymization::AnonymizeEvent::FieldProtected { tag, path, action } = event;
        sink.borrow_mut().push((*tag, path.depth(), *action));
    });

    anonymizer.set_target(instance("1.2.840.99.1", &["1.2.840.99.3"]));
    let report = anonymizer.run_confidentiality_profile(true).unwrap();

    let actions = actions.borrow();
    assert_eq!(actions.len(), report.fields_changed());
    assert!(actions.contains(&(PATIENT_NAME, 0, Action::Emptied)));
    assert!(actions.contains(&(STUDY_UID, 0, Action::Replaced)));
    assert!(actions.contains(&(INSTITUTION, 0, Action::Removed)));
    assert!(actions.contains(&(REFERENCED_INSTANCE_UID, 1, Action::Replaced)));
}

#[test]
fn test_audit_trail_records_tags_not_values() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("audit/trail.log");
    let logger = Rc::new(AuditLogger::new(log_path.clone(), true, true).unwrap());
    logger.set_source(Some("ct-001.json".to_string()));

    let mut anonymizer = Anonymizer::with_defaults().unwrap();
    anonymizer.subscribe(logger.observer());
    anonymizer.set_target(instance("1.2.840.99.1", &[]));
    let report = anonymizer.run_confidentiality_profile(true).unwrap();

    let contents = fs::read_to_string(&log_path).unwrap();
    let lines: Vec<serde_json::Value> = contents
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), report.fields_changed());
    assert!(lines.iter().all(|line| line["source"] == "ct-001.json"));
    assert!(lines.iter().any(|line| line["keyword"] == "PatientName"));
    assert!(!contents.contains("DOE^JANE"));
    assert!(!contents.contains("1.2.840.99.1\""));
}

#[test]
fn test_cli_processes_file_set_with_shared_pseudonyms() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.json");
    let second = dir.path().join("second.json");
    fs::write(
        &first,
        serde_json::to_string(&instance("1.2.840.99.1", &[])).unwrap(),
    )
    .unwrap();
    fs::write(
        &second,
        serde_json::to_string(&instance("1.2.840.99.1", &["1.2.840.99.3"])).unwrap(),
    )
    .unwrap();
    let config = dir.path().join("veil.toml");
    fs::write(&config, "[profile]\noptional_policy = \"keep\"\n").unwrap();

    let args = DeidentifyArgs {
        input: vec![first, second],
        output_dir: dir.path().join("out"),
        object_class: None,
        remove_private: false,
        remove_group_length: false,
        remove_retired: false,
        report: None,
    };
    assert_eq!(args.execute(config.to_str().unwrap()).unwrap(), 0);

    let read = |name: &str| -> Record {
        serde_json::from_str(&fs::read_to_string(dir.path().join("out").join(name)).unwrap())
            .unwrap()
    };
    let first = read("first.json");
    let second = read("second.json");
    assert_eq!(value(&first, STUDY_UID), value(&second, STUDY_UID));
    assert_eq!(value(&first, INSTITUTION).as_deref(), Some("St. Elsewhere"));
}
