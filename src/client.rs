//! StoredSafe REST client: session check, search, and decrypted object reads.
//!
//! All calls are blocking and go to `https://<server>/api/1.0`. Every call
//! carries the session token as a `token` parameter. Responses that cannot
//! be decoded are treated as "nothing found" rather than as errors.

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use ureq::http::Response;
use ureq::{Agent, Body};
use zeroize::Zeroizing;

use crate::errors::{Result, VaultClientError};
use crate::session::SessionState;

/// Status reported in `CALLINFO.status` for an authenticated session.
const STATUS_SUCCESS: &str = "SUCCESS";

/// A single StoredSafe object as returned by `/find` and `/object/<id>`.
///
/// `public` holds clear-text fields such as `host` and `username`;
/// `crypted` holds the decrypted fields (`password`) when the object was
/// requested with `decrypt=true`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VaultRecord {
    #[serde(deserialize_with = "numeric_id")]
    pub id: u64,

    #[serde(rename = "groupid", default, deserialize_with = "numeric_id")]
    pub group_id: u64,

    #[serde(default, deserialize_with = "string_fields")]
    pub public: BTreeMap<String, String>,

    #[serde(default, deserialize_with = "string_fields")]
    pub crypted: BTreeMap<String, String>,
}

impl VaultRecord {
    pub fn host(&self) -> Option<&str> {
        self.public.get("host").map(String::as_str)
    }

    pub fn username(&self) -> Option<&str> {
        self.public.get("username").map(String::as_str)
    }

    /// Decrypted password, if present and non-empty.
    pub fn password(&self) -> Option<&str> {
        self.crypted
            .get("password")
            .map(String::as_str)
            .filter(|p| !p.is_empty())
    }
}

/// Remote operations the lookup logic needs.
pub trait VaultApi {
    /// Search all reachable vaults for `needle`. Results are unfiltered.
    fn search(&self, needle: &str) -> Result<Vec<VaultRecord>>;

    /// Fetch the decrypted password of object `id`, or `None` if the
    /// object has none.
    fn get_password(&self, id: u64) -> Result<Option<Zeroizing<String>>>;
}

#[derive(Serialize)]
struct AuthCheckRequest<'a> {
    token: &'a str,
}

#[derive(Deserialize)]
struct AuthCheckResponse {
    #[serde(rename = "CALLINFO")]
    call_info: CallInfo,
}

#[derive(Deserialize)]
struct CallInfo {
    #[serde(default)]
    status: String,
}

#[derive(Deserialize)]
struct ObjectResponse {
    #[serde(rename = "OBJECT", default, deserialize_with = "object_list")]
    objects: Vec<VaultRecord>,
}

/// Accept ids sent either as JSON numbers or as numeric strings.
fn numeric_id<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| D::Error::custom(format!("invalid id {n}"))),
        serde_json::Value::String(s) => s
            .parse()
            .map_err(|_| D::Error::custom(format!("invalid id \"{s}\""))),
        other => Err(D::Error::custom(format!("invalid id {other}"))),
    }
}

/// Keep only the string-valued entries of a field map.
fn string_fields<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let fields: BTreeMap<String, String> = match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Object(map) => map
            .into_iter()
            .filter_map(|(k, v)| match v {
                serde_json::Value::String(s) => Some((k, s)),
                _ => None,
            })
            .collect(),
        _ => BTreeMap::new(),
    };
    Ok(fields)
}

/// `OBJECT` is an array of records; anything else means "no records".
/// Records that fail to decode are skipped so they cannot hide their
/// siblings.
fn object_list<'de, D>(deserializer: D) -> std::result::Result<Vec<VaultRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let records = match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::debug!(error = %e, "skipping undecodable record");
                    None
                }
            })
            .collect(),
        _ => Vec::new(),
    };
    Ok(records)
}

/// Password of the first object in an `/object/<id>` body.
///
/// Only `OBJECT[0].crypted.password` is read; the rest of the object may
/// be absent or malformed.
fn first_password(body: &serde_json::Value) -> Option<&str> {
    body.get("OBJECT")?
        .get(0)?
        .get("crypted")?
        .get("password")?
        .as_str()
        .filter(|p| !p.is_empty())
}

/// StoredSafe API client bound to one session.
pub struct VaultClient {
    agent: Agent,
    base_url: String,
    token: Zeroizing<String>,
}

impl VaultClient {
    /// Build the user-agent string from crate version.
    fn user_agent() -> String {
        format!("storedsafe-vault-client/{}", env!("CARGO_PKG_VERSION"))
    }

    /// Create a client for the server named in `session`.
    pub fn new(session: &SessionState) -> Self {
        let base_url = format!("https://{}/api/1.0", session.server_host());
        Self::with_base_url(base_url, session.auth_token())
    }

    /// Create a client at a custom base URL (used against mock servers).
    pub fn with_base_url(base_url: impl Into<String>, token: &str) -> Self {
        // Non-2xx responses are inspected by hand, not raised as errors.
        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .into();
        let base_url: String = base_url.into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            token: Zeroizing::new(token.to_owned()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn unreachable(&self, source: ureq::Error) -> VaultClientError {
        VaultClientError::Unreachable {
            url: self.base_url.clone(),
            source,
        }
    }

    /// Check the HTTP status and return the body text.
    fn read_body(&self, url: &str, mut response: Response<Body>) -> Result<String> {
        let status = response.status();
        if !status.is_success() {
            return Err(VaultClientError::RequestFailed {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }
        response
            .body_mut()
            .read_to_string()
            .map_err(|e| self.unreachable(e))
    }

    /// Confirm that the session token is still valid.
    ///
    /// Distinguishes an unreachable server (`Unreachable`), a rejected
    /// request (`NotAuthenticated`), and a session the server does not
    /// recognise (`SessionInvalid`).
    pub fn check_auth(&self) -> Result<()> {
        let url = format!("{}/auth/check", self.base_url);
        let response = self
            .agent
            .post(url.as_str())
            .header("User-Agent", Self::user_agent())
            .send_json(AuthCheckRequest {
                token: &self.token,
            })
            .map_err(|e| self.unreachable(e))?;

        let body = match self.read_body(&url, response) {
            Ok(body) => body,
            Err(VaultClientError::RequestFailed { status, .. }) => {
                tracing::debug!(status, "auth check rejected");
                return Err(VaultClientError::NotAuthenticated);
            }
            Err(e) => return Err(e),
        };

        match serde_json::from_str::<AuthCheckResponse>(&body) {
            Ok(resp) if resp.call_info.status == STATUS_SUCCESS => {
                tracing::debug!("Authenticated using token \"{}\".", self.token.as_str());
                Ok(())
            }
            Ok(resp) => {
                tracing::debug!(status = %resp.call_info.status, "auth check not successful");
                Err(VaultClientError::SessionInvalid)
            }
            Err(e) => {
                tracing::debug!(error = %e, "auth check response could not be decoded");
                Err(VaultClientError::SessionInvalid)
            }
        }
    }

    /// Decode an `OBJECT` envelope. Undecodable bodies yield no records.
    fn decode_objects(url: &str, body: &str) -> Vec<VaultRecord> {
        match serde_json::from_str::<ObjectResponse>(body) {
            Ok(resp) => resp.objects,
            Err(e) => {
                tracing::debug!(url, error = %e, "unexpected response from StoredSafe");
                Vec::new()
            }
        }
    }
}

impl VaultApi for VaultClient {
    fn search(&self, needle: &str) -> Result<Vec<VaultRecord>> {
        let url = format!("{}/find", self.base_url);
        let response = self
            .agent
            .get(url.as_str())
            .header("User-Agent", Self::user_agent())
            .query("token", self.token.as_str())
            .query("needle", needle)
            .call()
            .map_err(|e| self.unreachable(e))?;

        let body = self.read_body(&url, response)?;
        let records = Self::decode_objects(&url, &body);
        tracing::debug!(needle, count = records.len(), "search returned");
        Ok(records)
    }

    fn get_password(&self, id: u64) -> Result<Option<Zeroizing<String>>> {
        let url = format!("{}/object/{id}", self.base_url);
        let response = self
            .agent
            .get(url.as_str())
            .header("User-Agent", Self::user_agent())
            .query("token", self.token.as_str())
            .query("decrypt", "true")
            .call()
            .map_err(|e| self.unreachable(e))?;

        let body = Zeroizing::new(self.read_body(&url, response)?);
        let password = match serde_json::from_str::<serde_json::Value>(&body) {
            Ok(value) => first_password(&value).map(|p| Zeroizing::new(p.to_owned())),
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "unexpected response from StoredSafe");
                None
            }
        };

        if password.is_none() {
            tracing::debug!(id, "object has no decrypted password");
        }
        Ok(password)
    }
}
