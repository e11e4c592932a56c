//! Response checks for webhook transports.

use crate::error::CommsError;

/// Return the response unchanged on success, or [`CommsError::Api`] with the
/// status code and response body.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, CommsError> {
    if !resp.status().is_success() {
        return Err(CommsError::Api {
            status: resp.status().as_u16(),
            message: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_response(status: u16, body: &'static str) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .body(body)
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn check_response_api_error_keeps_body() {
        let resp = mock_response(502, "gateway down");
        let err = check_response(resp).await.unwrap_err();
        assert!(matches!(
            err,
            CommsError::Api { status: 502, ref message } if message == "gateway down"
        ));
        assert_eq!(err.to_string(), "API error (502): gateway down");
    }

    #[tokio::test]
    async fn check_response_success() {
        let resp = mock_response(202, "");
        assert!(check_response(resp).await.is_ok());
    }
}
