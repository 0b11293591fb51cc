use tport_domain::recipients::RecipientSet;

#[test]
fn roles_parse_case_insensitively() {
    assert_eq!(RecipientSet::from_role("Receiver"), RecipientSet::RECEIVER);
    assert_eq!(RecipientSet::from_role(" sender "), RecipientSet::SENDER);
    assert_eq!(RecipientSet::from_role("*"), RecipientSet::ALL);
    assert!(RecipientSet::from_role("carrier").is_empty());
}

#[test]
fn deserializes_from_lists_strings_and_bits() {
    let from_list: RecipientSet = serde_json::from_str(r#"["sender"]"#).unwrap();
    assert_eq!(from_list, RecipientSet::SENDER);

    let from_csv: RecipientSet = serde_json::from_str(r#""receiver,sender""#).unwrap();
    assert_eq!(from_csv, RecipientSet::ALL);

    let from_bits: RecipientSet = serde_json::from_str("2").unwrap();
    assert_eq!(from_bits, RecipientSet::SENDER);

    assert!(serde_json::from_str::<RecipientSet>(r#"["driver"]"#).is_err());
}

#[test]
fn serializes_as_role_names() {
    assert_eq!(serde_json::to_string(&RecipientSet::ALL).unwrap(), r#"["receiver","sender"]"#);
    assert_eq!(serde_json::to_string(&RecipientSet::default()).unwrap(), r#"["receiver"]"#);
}
