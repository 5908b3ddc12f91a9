//! End-to-end cart tests: gating, fragment responses, badge arithmetic,
//! and what happens when the backend misbehaves mid-flow.

mod common;

use common::{TestApp, badge_count};

#[tokio::test]
async fn cart_page_requires_sign_in_and_issues_no_cart_calls() {
    let app = TestApp::spawn().await;

    let response = app.get("/cart").await;
    assert_eq!(response.status(), 303);
    assert_eq!(response.headers()["location"], "/auth");

    assert_eq!(app.backend.hits().cart_reads, 0);
}

#[tokio::test]
async fn anonymous_fragment_mutation_gets_hx_redirect() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/cart/add"))
        .header("HX-Request", "true")
        .form(&[("product_id", "p-1"), ("quantity", "1")])
        .send()
        .await
        .unwrap();

    // htmx never swaps a 401; the HX-Redirect header navigates the whole
    // page to sign-in instead.
    assert_eq!(response.status(), 401);
    assert_eq!(response.headers()["hx-redirect"], "/auth");
    assert_eq!(app.backend.hits().cart_writes, 0);
}

#[tokio::test]
async fn badge_counts_units_across_lines() {
    let app = TestApp::spawn().await;
    app.sign_in().await;

    app.add_to_cart("p-1", 2).await;
    app.add_to_cart("p-2", 1).await;

    // Three units over two lines: the badge shows units.
    let fragment = app.get("/cart/count").await.text().await.unwrap();
    assert_eq!(badge_count(&fragment), 3);
}

#[tokio::test]
async fn add_returns_the_badge_and_fires_the_update_event() {
    let app = TestApp::spawn().await;
    app.sign_in().await;

    let response = app
        .post_form("/cart/add", &[("product_id", "p-1"), ("quantity", "1")])
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["hx-trigger"], "cart-updated");

    let body = response.text().await.unwrap();
    assert!(body.contains("id=\"cart-count\""));
    assert_eq!(badge_count(&body), 1);
}

#[tokio::test]
async fn repeated_adds_grow_one_line() {
    let app = TestApp::spawn().await;
    app.sign_in().await;

    app.add_to_cart("p-1", 1).await;
    app.add_to_cart("p-1", 2).await;

    // One line at quantity three, not two lines.
    let fragment = app.get("/cart/count").await.text().await.unwrap();
    assert_eq!(badge_count(&fragment), 3);

    let body = app.get("/cart").await.text().await.unwrap();
    assert!(body.contains("<span class=\"quantity\">3</span>"));
    assert!(body.contains("$30.00"));
}

#[tokio::test]
async fn update_rerenders_the_item_list() {
    let app = TestApp::spawn().await;
    app.sign_in().await;
    app.add_to_cart("p-1", 1).await;

    let response = app
        .post_form("/cart/update", &[("product_id", "p-1"), ("quantity", "3")])
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["hx-trigger"], "cart-updated");

    let body = response.text().await.unwrap();
    assert!(body.contains("id=\"cart-items\""));
    assert!(body.contains("$30.00"));
}

#[tokio::test]
async fn quantity_below_one_is_ignored_without_an_api_call() {
    let app = TestApp::spawn().await;
    app.sign_in().await;
    app.add_to_cart("p-1", 2).await;

    let writes_before = app.backend.hits().cart_writes;
    let response = app
        .post_form("/cart/update", &[("product_id", "p-1"), ("quantity", "0")])
        .await;

    assert_eq!(response.status(), 204);
    assert_eq!(app.backend.hits().cart_writes, writes_before);

    // The line is untouched.
    let fragment = app.get("/cart/count").await.text().await.unwrap();
    assert_eq!(badge_count(&fragment), 2);
}

#[tokio::test]
async fn remove_drops_the_line() {
    let app = TestApp::spawn().await;
    app.sign_in().await;
    app.add_to_cart("p-1", 2).await;
    app.add_to_cart("p-2", 1).await;

    let response = app
        .post_form("/cart/remove", &[("product_id", "p-1")])
        .await;
    assert_eq!(response.status(), 200);

    let body = response.text().await.unwrap();
    assert!(!body.contains("Wooden Train"));
    assert!(body.contains("Plush Octopus"));

    let fragment = app.get("/cart/count").await.text().await.unwrap();
    assert_eq!(badge_count(&fragment), 1);
}

#[tokio::test]
async fn cart_page_totals_sum_line_totals_with_free_shipping() {
    let app = TestApp::spawn().await;
    app.sign_in().await;
    app.add_to_cart("p-1", 2).await; // 2 x $10.00
    app.add_to_cart("p-2", 1).await; // 1 x $5.50

    let body = app.get("/cart").await.text().await.unwrap();
    assert!(body.contains("$25.50"), "subtotal and total should be $25.50");
    assert!(body.contains("Free"));
}

#[tokio::test]
async fn failed_mutation_leaves_the_badge_untouched() {
    let app = TestApp::spawn().await;
    app.sign_in().await;
    app.add_to_cart("p-1", 2).await;

    app.backend.set_fail_cart_writes(true);
    let response = app
        .post_form("/cart/add", &[("product_id", "p-2"), ("quantity", "1")])
        .await;
    // A non-2xx fragment response is never swapped into the page.
    assert_eq!(response.status(), 502);

    let fragment = app.get("/cart/count").await.text().await.unwrap();
    assert_eq!(badge_count(&fragment), 2);
}

#[tokio::test]
async fn badge_fragment_never_reads_the_cart_endpoint() {
    let app = TestApp::spawn().await;
    app.sign_in().await;
    app.add_to_cart("p-1", 1).await;

    let reads_before = app.backend.hits().cart_reads;
    for _ in 0..3 {
        let fragment = app.get("/cart/count").await.text().await.unwrap();
        assert_eq!(badge_count(&fragment), 1);
    }

    // The badge serves the session-cached count.
    assert_eq!(app.backend.hits().cart_reads, reads_before);
}
