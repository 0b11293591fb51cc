use tport_kernel::domain::constants::TRACKING_ID_PREFIX;
use tport_kernel::tracking::{generate_tracking_id, normalize};

#[test]
fn ids_sort_by_creation_time() {
    let first = generate_tracking_id();
    std::thread::sleep(std::time::Duration::from_millis(5));
    let second = generate_tracking_id();

    let stamp = |id: &str| id[TRACKING_ID_PREFIX.len()..id.len() - 6].to_owned();
    assert_eq!(stamp(&first).len(), stamp(&second).len());
    assert!(stamp(&first) < stamp(&second));
}

#[test]
fn normalized_lookup_matches_stored_form() {
    let id = generate_tracking_id();
    assert_eq!(normalize(&id.to_lowercase()), id);
}
