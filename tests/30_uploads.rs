mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};

fn sign_request(token: &str, body: &str) -> Result<Request<Body>> {
    Ok(Request::builder()
        .method("POST")
        .uri("/api/uploads/sign")
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))?)
}

#[tokio::test]
async fn sign_upload_returns_url_token_path_and_public_url() -> Result<()> {
    let token = common::session_token("user_ext_uploader");
    let req = sign_request(&token, r#"{"fileName":"my face.png","fileType":"image/png"}"#)?;

    let (status, body) = common::body_json(common::request(req).await?).await?;
    assert_eq!(status, StatusCode::OK);

    let path = body["path"].as_str().expect("path");
    assert!(path.starts_with("tmp/user_ext_uploader/"));
    assert!(path.ends_with("my_face.png"));

    let signed_url = body["signedUrl"].as_str().expect("signedUrl");
    let upload_token = body["token"].as_str().expect("token");
    assert!(signed_url.contains(path));
    assert!(signed_url.contains(upload_token));

    let public_url = body["publicUrl"].as_str().expect("publicUrl");
    assert!(public_url.contains(path));
    assert!(public_url.contains("/object/public/"));

    Ok(())
}

#[tokio::test]
async fn two_signings_of_the_same_filename_yield_distinct_paths() -> Result<()> {
    let token = common::session_token("user_ext_uploader");

    let req = sign_request(&token, r#"{"fileName":"face.png"}"#)?;
    let (_, first) = common::body_json(common::request(req).await?).await?;

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let req = sign_request(&token, r#"{"fileName":"face.png"}"#)?;
    let (_, second) = common::body_json(common::request(req).await?).await?;

    assert_ne!(first["path"], second["path"]);

    Ok(())
}

#[tokio::test]
async fn sign_upload_without_filename_is_rejected() -> Result<()> {
    let token = common::session_token("user_ext_uploader");
    let req = sign_request(&token, r#"{"fileType":"image/png"}"#)?;

    let response = common::request(req).await?;
    assert!(response.status().is_client_error());

    Ok(())
}
