//! Static asset serving tests.

mod common;

use common::TestApp;

#[tokio::test]
async fn stylesheet_is_served_regardless_of_working_directory() {
    let app = TestApp::spawn().await;

    // The asset mount is anchored to the crate directory, not to wherever
    // the process happens to be launched from.
    let css = app.get("/static/css/main.css").await;
    assert_eq!(css.status(), 200);
    let body = css.text().await.unwrap();
    assert!(body.contains(".site-nav"));
}
