// tests/plugins_trending.rs
use shorts_idea_harvester::ingest::plugins::TrendingPlugin;
use shorts_idea_harvester::{FetchParams, SourcePlugin};

const FIXTURE: &str = include_str!("fixtures/trending.json");

fn params(category: Option<&str>, max_results: usize) -> FetchParams {
    FetchParams::Trending {
        region: "US".to_string(),
        category: category.map(str::to_string),
        max_results,
    }
}

#[tokio::test]
async fn trending_listing_carries_rank_positions() {
    let plugin = TrendingPlugin::from_fixture(FIXTURE);
    let out = plugin.fetch(&params(None, 50)).await.unwrap();

    assert_eq!(out.len(), 3);
    let t1 = &out[0];
    assert_eq!(t1.source_type, "trending");
    assert_eq!(t1.external_id, "t1");
    assert_eq!(t1.metric("rank"), Some(1.0));
    // climbed from 4 to 1
    assert_eq!(t1.metric("rank_improvement"), Some(3.0));
    assert_eq!(t1.metric("views"), Some(2_400_000.0));
    // no like counts from a trending feed
    assert_eq!(t1.metric("likes"), None);

    // held steady: improvement 0
    assert_eq!(out[1].metric("rank_improvement"), Some(0.0));
    // dropped from 1 to 3: floors at 0, never negative
    assert_eq!(out[2].metric("rank_improvement"), Some(0.0));
}

#[tokio::test]
async fn category_filter_and_bound_apply() {
    let plugin = TrendingPlugin::from_fixture(FIXTURE);
    let out = plugin.fetch(&params(Some("food"), 50)).await.unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].external_id, "t2");

    let bounded = plugin.fetch(&params(None, 1)).await.unwrap();
    assert_eq!(bounded.len(), 1);
}
