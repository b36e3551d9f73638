use sketch_relay::core::room::RoomDirectory;

#[test]
fn test_count_tracks_cardinality_across_sequences() {
    let mut directory = RoomDirectory::new();

    directory.join("r1", "a");
    directory.join("r1", "b");
    directory.join("r1", "c");
    assert_eq!(directory.member_count("r1"), 3);

    directory.leave("r1", "b");
    assert_eq!(directory.member_count("r1"), 2);

    directory.join("r1", "b");
    directory.join("r1", "b");
    assert_eq!(directory.member_count("r1"), 3);

    directory.leave("r1", "a");
    directory.leave("r1", "b");
    directory.leave("r1", "c");
    assert_eq!(directory.member_count("r1"), 0);
}

#[test]
fn test_room_present_iff_member_set_nonempty() {
    let mut directory = RoomDirectory::new();
    assert!(!directory.room_exists("r1"));

    directory.join("r1", "a");
    assert!(directory.room_exists("r1"));

    directory.leave("r1", "a");
    assert!(!directory.room_exists("r1"));
    assert_eq!(directory.room_count(), 0);

    // recreate after deletion works like a first join
    directory.join("r1", "b");
    assert!(directory.room_exists("r1"));
    assert_eq!(directory.members_of("r1").len(), 1);
}

#[test]
fn test_independent_rooms_do_not_interfere() {
    let mut directory = RoomDirectory::new();
    directory.join("r1", "a");
    directory.join("r2", "a");
    directory.join("r2", "b");

    directory.leave("r1", "a");
    assert!(!directory.room_exists("r1"));
    assert!(directory.room_exists("r2"));
    assert!(directory.contains("r2", "a"));
    assert!(directory.contains("r2", "b"));
}
