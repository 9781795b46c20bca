use serde::de::DeserializeOwned;

use crate::csrf::extract_csrf_token;
use crate::error::ClientError;

pub const DEFAULT_WEB_BASE: &str = "https://easyverein.com";

const CSRF_HEADER: &str = "X-CSRFToken";

/// An authenticated browser-like session against the EV web UI.
///
/// The cookie store carries the server session; the CSRF token rotates on
/// every page navigation and POST, so it is tracked separately and re-read
/// from each page the server renders. One session is created per sync run
/// and simply dropped afterwards; there is no logout.
pub struct EvSession {
    http: reqwest::Client,
    base_url: String,
    csrf_token: String,
}

impl EvSession {
    /// Logs into the EV web UI with the shortcode/email/password triple.
    ///
    /// EV answers a failed login with HTTP 200 and the login form rendered
    /// again, so the outcome is checked against the response body rather
    /// than the status code.
    pub async fn login(
        base_url: &str,
        short: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        let base_url = base_url.trim_end_matches('/').to_string();
        let landing = format!("{base_url}/app/");

        let body = http.get(&landing).send().await?.text().await?;
        let csrf_token = extract_csrf_token(&body)
            .ok_or(ClientError::CsrfTokenMissing)?
            .to_string();

        let form = [
            ("csrfmiddlewaretoken", csrf_token.as_str()),
            ("short", short),
            ("email", email),
            ("password", password),
            ("loginbutton", ""),
        ];
        let body = http
            .post(&landing)
            .header("Referer", &landing)
            .header(CSRF_HEADER, &csrf_token)
            .form(&form)
            .send()
            .await?
            .text()
            .await?;

        if body.contains(r#"name="loginbutton""#) {
            return Err(ClientError::LoginRejected);
        }

        // Tokens rotate after the POST; pick up the fresh one.
        let csrf_token = extract_csrf_token(&body)
            .ok_or(ClientError::CsrfTokenMissing)?
            .to_string();

        Ok(EvSession { http, base_url, csrf_token })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GETs a web-UI page and stores the rotated CSRF token it embeds.
    /// State-changing POSTs need a token scoped to the page they belong to.
    pub(crate) async fn get_page(&mut self, path: &str) -> Result<String, ClientError> {
        let body = self
            .http
            .get(self.url(path))
            .header(CSRF_HEADER, &self.csrf_token)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        self.csrf_token = extract_csrf_token(&body)
            .ok_or(ClientError::CsrfTokenMissing)?
            .to_string();
        Ok(body)
    }

    /// GETs a JSON endpoint of the web UI (these do not rotate the token).
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ClientError> {
        let value = self
            .http
            .get(self.url(path))
            .header(CSRF_HEADER, &self.csrf_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(value)
    }

    /// GETs an endpoint for its side effect, checking only the status.
    pub(crate) async fn get_ok(&self, path: &str) -> Result<(), ClientError> {
        self.http
            .get(self.url(path))
            .header(CSRF_HEADER, &self.csrf_token)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// POSTs a JSON body to a web-UI endpoint under the current token.
    pub(crate) async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<(), ClientError> {
        self.http
            .post(self.url(path))
            .header(CSRF_HEADER, &self.csrf_token)
            .header("Referer", self.url(path))
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
