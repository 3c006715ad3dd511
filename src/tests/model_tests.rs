use super::*;

fn chat(id: &str, favorite: bool, updated_at: Option<&str>) -> ChatSummary {
    ChatSummary {
        id: id.to_string(),
        shareable: false,
        privacy: Privacy::Private,
        name: None,
        title: None,
        updated_at: updated_at.map(str::to_string),
        favorite,
        author_id: "author".to_string(),
        project_id: None,
        latest_version: None,
    }
}

#[test]
fn display_order_partitions_favorites_then_recency() {
    // T3 > T2 > T1, but only the non-favorite carries T3.
    let items = vec![
        chat("t1", true, Some("2026-01-01T00:00:00Z")),
        chat("t3", false, Some("2026-03-01T00:00:00Z")),
        chat("t2", true, Some("2026-02-01T00:00:00Z")),
    ];
    let sorted = sorted_for_display(&items);
    let ids: Vec<&str> = sorted.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["t2", "t1", "t3"]);
}

#[test]
fn display_order_puts_unparseable_timestamps_last_in_partition() {
    let items = vec![
        chat("bad", false, Some("not-a-date")),
        chat("missing", false, None),
        chat("dated", false, Some("2026-01-01T00:00:00Z")),
    ];
    let sorted = sorted_for_display(&items);
    assert_eq!(sorted[0].id, "dated");
}

#[test]
fn display_name_prefers_name_then_deprecated_title() {
    let mut c = chat("c1", false, None);
    assert_eq!(c.display_name(), "Untitled Chat");
    c.title = Some("old title".to_string());
    assert_eq!(c.display_name(), "old title");
    c.name = Some("new name".to_string());
    assert_eq!(c.display_name(), "new name");
}

#[test]
fn privacy_uses_kebab_case_on_the_wire() {
    assert_eq!(
        serde_json::to_value(Privacy::TeamEdit).unwrap(),
        serde_json::json!("team-edit")
    );
    let parsed: Privacy = serde_json::from_value(serde_json::json!("unlisted")).unwrap();
    assert_eq!(parsed, Privacy::Unlisted);
}

#[test]
fn chat_summary_tolerates_sparse_payloads() {
    let parsed: ChatSummary = serde_json::from_value(serde_json::json!({
        "id": "c1",
        "privacy": "private"
    }))
    .unwrap();
    assert_eq!(parsed.id, "c1");
    assert!(!parsed.favorite);
    assert!(parsed.latest_version.is_none());
}
