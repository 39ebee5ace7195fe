#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::test_app;
use divelog::SecurityContext;
use divelog_sdk::{DepthUnit, UnitPreferences, UnitPreferencesPatch, WeightUnit};

#[tokio::test]
async fn local_client_reads_and_patches_preferences() {
    let app = test_app().await;
    let cookie = app.register("client@example.com").await;
    let me = app.get("/divelog/v1/account", &cookie).await;
    let user_id = me.data()["id"].as_str().unwrap().parse().unwrap();
    let ctx = SecurityContext::new(user_id, 0);

    let client = app.module.preferences_client();
    assert_eq!(
        client.get_preferences(&ctx).await.unwrap(),
        UnitPreferences::default()
    );

    let updated = client
        .patch_preferences(
            &ctx,
            UnitPreferencesPatch {
                weight: Some(WeightUnit::Pound),
                ..UnitPreferencesPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.weight, WeightUnit::Pound);
    assert_eq!(updated.depth, DepthUnit::Meters);
}
