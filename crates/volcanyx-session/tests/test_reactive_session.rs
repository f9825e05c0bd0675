//! End-to-end behaviour of a session actor against fixture data and a mock
//! annotation source.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::sync::Notify;
use volcanyx_annotate::{AnnotationFetcher, MockAnnotationSource, MockFailure};
use volcanyx_common::config::ControlsConfig;
use volcanyx_common::ColorCategory;
use volcanyx_plot::ClickPayload;
use volcanyx_session::{ClickOutcome, ControlUpdate, LinkStatus, SessionHandle, SessionRegistry};
use volcanyx_test_utils::{fixture_store, missing_columns_store, paper, within};

fn fetcher(source: MockAnnotationSource) -> AnnotationFetcher {
    AnnotationFetcher::new(Arc::new(source), Duration::from_secs(2))
}

fn spawn(source: MockAnnotationSource) -> SessionHandle {
    SessionHandle::spawn(fixture_store(), fetcher(source), ControlsConfig::default(), 16)
}

fn click(symbol: &str) -> ClickPayload {
    ClickPayload::from_value(json!({ "points": [{ "pointIndex": 0, "hovertext": symbol }] }))
}

fn color_of(snapshot: &volcanyx_session::ViewSnapshot, symbol: &str) -> ColorCategory {
    snapshot
        .volcano
        .as_ref()
        .and_then(|v| v.points.iter().find(|p| p.symbol == symbol))
        .map(|p| p.color)
        .unwrap_or_else(|| panic!("{} not plotted", symbol))
}

#[tokio::test]
async fn test_initial_render_uses_defaults() {
    let session = spawn(MockAnnotationSource::new());
    let snapshot = within(session.wait_for_volcano(1)).await.unwrap();
    let volcano = snapshot.volcano.unwrap();
    assert_eq!((volcano.width, volcano.height), (1200, 700));
    assert_eq!(volcano.threshold, 0.05);
    assert_eq!(volcano.points.len(), 6);
    assert!(snapshot.controls.selected_gene.is_none());
    assert!(!snapshot.drilldown.visible);
}

#[tokio::test]
async fn test_tightening_threshold_flips_mid_range_genes() {
    let session = spawn(MockAnnotationSource::new());
    let before = within(session.wait_for_volcano(1)).await.unwrap();
    assert_eq!(color_of(&before, "KRAS"), ColorCategory::Down);
    assert_eq!(color_of(&before, "CLU"), ColorCategory::Up);

    let generation = session
        .update_controls(ControlUpdate { threshold: Some(0.01), ..Default::default() })
        .await
        .unwrap();
    let after = within(session.wait_for_volcano(generation)).await.unwrap();

    assert_eq!(after.controls.significance_threshold, 0.01);
    assert_eq!(color_of(&after, "KRAS"), ColorCategory::NotSignificant);
    assert_eq!(color_of(&after, "CLU"), ColorCategory::NotSignificant);
    // still significant genes keep their direction
    assert_eq!(color_of(&after, "TP53"), ColorCategory::Up);
    assert_eq!(color_of(&after, "APOE"), ColorCategory::Up);
}

#[tokio::test]
async fn test_latest_controls_win() {
    let session = spawn(MockAnnotationSource::new());
    let mut last = 0;
    for (i, width) in [500u32, 700, 900, 1100, 1300].iter().enumerate() {
        last = session
            .update_controls(ControlUpdate {
                width: Some(*width),
                height: Some(400 + i as u32 * 100),
                ..Default::default()
            })
            .await
            .unwrap();
    }
    let snapshot = within(session.wait_for_volcano(last)).await.unwrap();
    let volcano = snapshot.volcano.unwrap();
    assert_eq!((volcano.width, volcano.height), (1300, 800));
    assert_eq!(snapshot.volcano_generation, last);
}

#[tokio::test]
async fn test_out_of_range_controls_are_clamped() {
    let session = spawn(MockAnnotationSource::new());
    let generation = session
        .update_controls(ControlUpdate { threshold: Some(0.9), width: Some(10), height: Some(9999) })
        .await
        .unwrap();
    let volcano = within(session.wait_for_volcano(generation)).await.unwrap().volcano.unwrap();
    assert_eq!(volcano.threshold, 0.1);
    assert_eq!((volcano.width, volcano.height), (400, 1200));
}

#[tokio::test]
async fn test_click_shows_panel_and_links() {
    let source = MockAnnotationSource::new().with_gene("TP53", "7157", vec![paper(11), paper(12)]);
    let session = spawn(source);

    let outcome = session.click(click("TP53")).await.unwrap();
    let ClickOutcome::Selected { gene, generation } = outcome else {
        panic!("expected a selection");
    };
    assert_eq!(gene, "TP53");

    let snapshot = session.snapshot();
    assert!(snapshot.drilldown.visible);
    assert_eq!(snapshot.controls.selected_gene.as_deref(), Some("TP53"));
    let groups = snapshot.drilldown.panel.unwrap().groups.unwrap();
    assert_eq!((groups.old.len(), groups.young.len()), (3, 2));

    let snapshot = within(session.wait_for_links(generation)).await.unwrap();
    assert_eq!(snapshot.links.gene.as_deref(), Some("TP53"));
    assert_eq!(snapshot.links.status, LinkStatus::Ready { papers: vec![paper(11), paper(12)] });
}

#[tokio::test]
async fn test_absent_gene_shows_placeholder_panel() {
    let session = spawn(MockAnnotationSource::new());
    let outcome = session.click(click("NOEXPR")).await.unwrap();
    assert!(matches!(outcome, ClickOutcome::Selected { .. }));

    let snapshot = session.snapshot();
    assert!(snapshot.drilldown.visible);
    let panel = snapshot.drilldown.panel.unwrap();
    assert_eq!(panel.title, "no expression data found for NOEXPR");
    assert!(panel.groups.is_none());
}

#[tokio::test]
async fn test_malformed_click_keeps_previous_panel() {
    let source = MockAnnotationSource::new().with_gene("APOE", "348", vec![paper(1)]);
    let session = spawn(source);
    session.click(click("APOE")).await.unwrap();
    let before = session.snapshot();

    for payload in [json!({}), json!({ "points": [] }), json!({ "points": [{ "pointIndex": 4 }] })] {
        let outcome = session.click(ClickPayload::from_value(payload)).await.unwrap();
        assert_eq!(outcome, ClickOutcome::Ignored);
    }

    let after = session.snapshot();
    assert!(after.drilldown.visible);
    assert_eq!(after.controls.selected_gene.as_deref(), Some("APOE"));
    assert_eq!(after.selection_generation, before.selection_generation);
    assert_eq!(after.drilldown, before.drilldown);
}

#[tokio::test]
async fn test_rapid_clicks_slow_second_fetch_b_wins() {
    let gate_a = Arc::new(Notify::new());
    let gate_b = Arc::new(Notify::new());
    let source = MockAnnotationSource::new()
        .with_gene("TP53", "7157", vec![paper(1)])
        .with_gene("APOE", "348", vec![paper(2)])
        .with_gate("TP53", gate_a.clone())
        .with_gate("APOE", gate_b.clone());
    let session = spawn(source);

    session.click(click("TP53")).await.unwrap();
    let ClickOutcome::Selected { generation: gen_b, .. } = session.click(click("APOE")).await.unwrap() else {
        panic!("expected a selection");
    };

    // A resolves first and must be discarded
    gate_a.notify_one();
    tokio::time::sleep(Duration::from_millis(50)).await;
    let mid = session.snapshot();
    assert_eq!(mid.links.gene.as_deref(), Some("APOE"));
    assert_eq!(mid.links.status, LinkStatus::Loading);

    gate_b.notify_one();
    let snapshot = within(session.wait_for_links(gen_b)).await.unwrap();
    assert_eq!(snapshot.controls.selected_gene.as_deref(), Some("APOE"));
    assert_eq!(snapshot.drilldown.panel.unwrap().selected_gene, "APOE");
    assert_eq!(snapshot.links.gene.as_deref(), Some("APOE"));
    assert_eq!(snapshot.links.status, LinkStatus::Ready { papers: vec![paper(2)] });
}

#[tokio::test]
async fn test_rapid_clicks_late_first_fetch_is_discarded() {
    let gate_a = Arc::new(Notify::new());
    let source = MockAnnotationSource::new()
        .with_gene("TP53", "7157", vec![paper(1)])
        .with_gene("APOE", "348", vec![paper(2)])
        .with_gate("TP53", gate_a.clone());
    let session = spawn(source);

    session.click(click("TP53")).await.unwrap();
    let ClickOutcome::Selected { generation: gen_b, .. } = session.click(click("APOE")).await.unwrap() else {
        panic!("expected a selection");
    };
    within(session.wait_for_links(gen_b)).await.unwrap();

    gate_a.notify_one();
    tokio::time::sleep(Duration::from_millis(50)).await;
    let snapshot = session.snapshot();
    assert_eq!(snapshot.links.gene.as_deref(), Some("APOE"));
    assert_eq!(snapshot.links.status, LinkStatus::Ready { papers: vec![paper(2)] });
}

#[tokio::test]
async fn test_hung_fetch_does_not_block_chart_recompute() {
    let never = Arc::new(Notify::new());
    let source = MockAnnotationSource::new()
        .with_gene("TP53", "7157", vec![paper(1)])
        .with_gate("TP53", never.clone());
    let session = spawn(source);

    session.click(click("TP53")).await.unwrap();
    let generation = session
        .update_controls(ControlUpdate { threshold: Some(0.05), width: Some(1200), height: Some(700) })
        .await
        .unwrap();
    let snapshot = within(session.wait_for_volcano(generation)).await.unwrap();
    assert_eq!(snapshot.volcano_generation, generation);
    assert_eq!(snapshot.links.status, LinkStatus::Loading);
}

#[tokio::test]
async fn test_network_failure_yields_message() {
    let source = MockAnnotationSource::new()
        .with_gene("EGFR", "1956", vec![paper(9)])
        .with_failure("EGFR", MockFailure::Status(502));
    let session = spawn(source);

    let ClickOutcome::Selected { generation, .. } = session.click(click("EGFR")).await.unwrap() else {
        panic!("expected a selection");
    };
    let snapshot = within(session.wait_for_links(generation)).await.unwrap();
    match snapshot.links.status {
        LinkStatus::Failed { message } => assert!(!message.is_empty()),
        other => panic!("expected failure, got {:?}", other),
    }
    // panel is unaffected by the fetch failure
    assert!(snapshot.drilldown.visible);
}

#[tokio::test]
async fn test_missing_columns_serves_placeholder() {
    let session = SessionHandle::spawn(
        missing_columns_store(),
        fetcher(MockAnnotationSource::new()),
        ControlsConfig::default(),
        16,
    );
    let volcano = within(session.wait_for_volcano(1)).await.unwrap().volcano.unwrap();
    assert!(volcano.placeholder);
    assert_eq!(volcano.title, "Volcano Plot (Required Columns Missing)");
}

#[tokio::test]
async fn test_events_are_published() {
    let session = spawn(MockAnnotationSource::new().with_gene("KRAS", "3845", vec![paper(5)]));
    let mut events = session.subscribe();
    session.click(click("KRAS")).await.unwrap();

    let mut kinds = Vec::new();
    while kinds.len() < 3 {
        let event = within(events.recv()).await.unwrap();
        let value = serde_json::to_value(&event).unwrap();
        let kind = value["type"].as_str().unwrap().to_string();
        if kind != "volcano_updated" {
            kinds.push(kind);
        }
    }
    assert_eq!(kinds, vec!["drill_down_updated", "links_updated", "links_updated"]);
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let registry = SessionRegistry::new(
        fixture_store(),
        fetcher(MockAnnotationSource::new()),
        ControlsConfig::default(),
        16,
    );
    let a = registry.create().await;
    let b = registry.create().await;
    assert_ne!(a.id(), b.id());
    assert_eq!(registry.len().await, 2);

    let ga = a.update_controls(ControlUpdate { threshold: Some(0.01), ..Default::default() }).await.unwrap();
    let gb = b.update_controls(ControlUpdate { threshold: Some(0.1), ..Default::default() }).await.unwrap();
    let sa = within(a.wait_for_volcano(ga)).await.unwrap();
    let sb = within(b.wait_for_volcano(gb)).await.unwrap();
    assert_eq!(color_of(&sa, "KRAS"), ColorCategory::NotSignificant);
    assert_eq!(color_of(&sb, "KRAS"), ColorCategory::Down);

    assert!(registry.remove(&a.id()).await);
    assert!(registry.get(&a.id()).await.is_none());
    assert!(registry.get(&b.id()).await.is_some());
}

#[tokio::test]
async fn test_reclicking_same_gene_refetches() {
    let source = Arc::new(MockAnnotationSource::new().with_gene("TP53", "7157", vec![paper(1)]));
    let fetcher = AnnotationFetcher::new(source.clone(), Duration::from_secs(2));
    let session = SessionHandle::spawn(fixture_store(), fetcher, ControlsConfig::default(), 16);

    let ClickOutcome::Selected { generation: first, .. } = session.click(click("TP53")).await.unwrap() else {
        panic!("expected a selection");
    };
    within(session.wait_for_links(first)).await.unwrap();
    let ClickOutcome::Selected { generation: second, .. } = session.click(click("TP53")).await.unwrap() else {
        panic!("expected a selection");
    };
    assert!(second > first);

    let snapshot = within(session.wait_for_links(second)).await.unwrap();
    assert_eq!(snapshot.links.generation, second);
    assert_eq!(snapshot.links.status, LinkStatus::Ready { papers: vec![paper(1)] });
    assert_eq!(source.calls(), 2);
}
