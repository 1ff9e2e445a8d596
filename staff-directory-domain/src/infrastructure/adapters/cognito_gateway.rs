use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::ports::{ConfigurationPort, HttpConfig, IdentityGateway, ProviderConfig};
use crate::domain::{
    entities::{Attributes, Identity, NewIdentity},
    errors::{ConfigError, ConfigResult, GatewayError, GatewayResult},
};

const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";
const AMZ_JSON: &str = "application/x-amz-json-1.1";
const USER_NOT_FOUND: &str = "UserNotFoundException";

/// Cognito user pool adapter implementing the IdentityGateway port.
///
/// Requests use the JSON 1.1 protocol. Request signing is not done here:
/// point `endpoint` at a signing proxy or a local emulator.
pub struct CognitoIdentityGateway {
    client: reqwest::Client,
    config: ProviderConfig,
    timeout_seconds: u64,
}

impl CognitoIdentityGateway {
    pub fn new(config: ProviderConfig, http: &HttpConfig) -> ConfigResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(http.get_timeout())
            .connect_timeout(http.get_connect_timeout())
            .user_agent(http.user_agent.clone())
            .build()
            .map_err(|e| ConfigError::HttpClient {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            config,
            timeout_seconds: http.timeout_seconds,
        })
    }

    pub fn new_with_client(config: ProviderConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            config,
            timeout_seconds: HttpConfig::default().timeout_seconds,
        }
    }

    pub fn from_config(config: &dyn ConfigurationPort) -> ConfigResult<Self> {
        config.validate()?;
        Self::new(
            config.get_provider_config().clone(),
            config.get_http_config(),
        )
    }

    pub fn user_pool_id(&self) -> &str {
        &self.config.user_pool_id
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        action: &str,
        handle: &str,
        body: &B,
    ) -> GatewayResult<reqwest::Response> {
        debug!("Calling {} for '{}'", action, handle);

        let response = self
            .client
            .post(self.config.endpoint_url())
            .header("X-Amz-Target", format!("{TARGET_PREFIX}.{action}"))
            .header(reqwest::header::CONTENT_TYPE, AMZ_JSON)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        Err(self.failed_response(status, response.text().await, handle))
    }

    /// Error for a non-success status; an unreadable body is a transport failure
    fn failed_response(
        &self,
        status: reqwest::StatusCode,
        body: reqwest::Result<String>,
        handle: &str,
    ) -> GatewayError {
        match body {
            Ok(text) => provider_error(status, &text, handle),
            Err(e) => self.transport_error(e),
        }
    }

    async fn call<B, R>(&self, action: &str, handle: &str, body: &B) -> GatewayResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.send(action, handle, body).await?;
        let text = response.text().await.map_err(|e| self.transport_error(e))?;

        serde_json::from_str(&text).map_err(|e| GatewayError::MalformedResponse {
            message: format!("{action}: {e}"),
        })
    }

    async fn call_unit<B: Serialize + ?Sized>(
        &self,
        action: &str,
        handle: &str,
        body: &B,
    ) -> GatewayResult<()> {
        self.send(action, handle, body).await.map(|_| ())
    }

    fn transport_error(&self, e: reqwest::Error) -> GatewayError {
        if e.is_timeout() {
            GatewayError::Timeout {
                seconds: self.timeout_seconds,
            }
        } else {
            GatewayError::Transport {
                message: e.to_string(),
            }
        }
    }

    fn user_request<'a>(&'a self, handle: &'a str) -> UserRequest<'a> {
        UserRequest {
            user_pool_id: &self.config.user_pool_id,
            username: handle,
        }
    }
}

/// Map a non-success response to a gateway error
fn provider_error(status: reqwest::StatusCode, body: &str, handle: &str) -> GatewayError {
    let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) else {
        return GatewayError::rejected(format!("HTTP {}", status.as_u16()), body);
    };

    // `__type` may be namespaced, e.g. "com.amazonaws...#UserNotFoundException"
    let code = parsed
        .error_type
        .rsplit('#')
        .next()
        .unwrap_or_default()
        .to_string();

    if code == USER_NOT_FOUND {
        return GatewayError::UserNotFound {
            handle: handle.to_string(),
        };
    }

    let message = parsed
        .message
        .or(parsed.message_upper)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

    GatewayError::Rejected { code, message }
}

fn to_wire_attributes(attributes: &Attributes) -> Vec<AttributeType> {
    let mut wire: Vec<AttributeType> = attributes
        .iter()
        .map(|(name, value)| AttributeType {
            name: name.to_string(),
            value: value.to_string(),
        })
        .collect();
    wire.sort_by(|a, b| a.name.cmp(&b.name));
    wire
}

fn from_wire_attributes(attributes: Vec<AttributeType>) -> Attributes {
    attributes.into_iter().map(|a| (a.name, a.value)).collect()
}

#[async_trait]
impl IdentityGateway for CognitoIdentityGateway {
    #[instrument(skip(self, candidate), fields(handle = %candidate.handle))]
    async fn create(&self, candidate: &NewIdentity, send_invite: bool) -> GatewayResult<Identity> {
        let request = AdminCreateUserRequest {
            user_pool_id: &self.config.user_pool_id,
            username: &candidate.handle,
            user_attributes: to_wire_attributes(&candidate.attributes),
            temporary_password: candidate.password(),
            // Omitting the action lets the pool send its invitation
            message_action: (!send_invite).then_some("SUPPRESS"),
        };

        let response: AdminCreateUserResponse = self
            .call("AdminCreateUser", &candidate.handle, &request)
            .await?;

        Ok(response.user.into_identity(Vec::new()))
    }

    async fn enable(&self, handle: &str) -> GatewayResult<()> {
        self.call_unit("AdminEnableUser", handle, &self.user_request(handle))
            .await
    }

    async fn disable(&self, handle: &str) -> GatewayResult<()> {
        self.call_unit("AdminDisableUser", handle, &self.user_request(handle))
            .await
    }

    #[instrument(skip(self, password))]
    async fn set_password(
        &self,
        handle: &str,
        password: &str,
        permanent: bool,
    ) -> GatewayResult<()> {
        let request = AdminSetUserPasswordRequest {
            user_pool_id: &self.config.user_pool_id,
            username: handle,
            password,
            permanent,
        };

        self.call_unit("AdminSetUserPassword", handle, &request)
            .await
    }

    async fn add_to_group(&self, handle: &str, group: &str) -> GatewayResult<()> {
        let request = AdminAddUserToGroupRequest {
            user_pool_id: &self.config.user_pool_id,
            username: handle,
            group_name: group,
        };

        self.call_unit("AdminAddUserToGroup", handle, &request)
            .await
    }

    async fn get(&self, handle: &str) -> GatewayResult<Identity> {
        let response: AdminGetUserResponse = self
            .call("AdminGetUser", handle, &self.user_request(handle))
            .await?;

        let groups = self.list_groups(handle).await?;

        Ok(Identity {
            handle: response.username,
            active: response.enabled.unwrap_or(true),
            attributes: from_wire_attributes(response.user_attributes),
            groups: groups.into_iter().collect(),
        })
    }

    #[instrument(skip(self))]
    async fn list(&self, limit: i32, filter: Option<&str>) -> GatewayResult<Vec<Identity>> {
        let request = ListUsersRequest {
            user_pool_id: &self.config.user_pool_id,
            limit: self.config.effective_limit(limit),
            filter: filter.filter(|f| !f.trim().is_empty()),
        };

        let response: ListUsersResponse = self.call("ListUsers", "", &request).await?;

        let mut identities = Vec::with_capacity(response.users.len());
        for user in response.users {
            let groups = self.list_groups(&user.username).await?;
            identities.push(user.into_identity(groups));
        }
        Ok(identities)
    }

    async fn list_groups(&self, handle: &str) -> GatewayResult<Vec<String>> {
        let mut groups = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let request = AdminListGroupsForUserRequest {
                user_pool_id: &self.config.user_pool_id,
                username: handle,
                next_token: next_token.as_deref(),
            };

            let response: AdminListGroupsForUserResponse = self
                .call("AdminListGroupsForUser", handle, &request)
                .await?;

            groups.extend(response.groups.into_iter().map(|g| g.group_name));

            match response.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => break,
            }
        }

        Ok(groups)
    }

    #[instrument(skip(self, attributes))]
    async fn update_attributes(
        &self,
        handle: &str,
        attributes: &Attributes,
    ) -> GatewayResult<()> {
        let request = AdminUpdateUserAttributesRequest {
            user_pool_id: &self.config.user_pool_id,
            username: handle,
            user_attributes: to_wire_attributes(attributes),
        };

        self.call_unit("AdminUpdateUserAttributes", handle, &request)
            .await
    }
}

// Wire types for the Cognito JSON protocol

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AttributeType {
    name: String,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "__type")]
    error_type: String,
    message: Option<String>,
    #[serde(rename = "Message")]
    message_upper: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct UserRequest<'a> {
    user_pool_id: &'a str,
    username: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct AdminCreateUserRequest<'a> {
    user_pool_id: &'a str,
    username: &'a str,
    user_attributes: Vec<AttributeType>,
    temporary_password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_action: Option<&'static str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AdminCreateUserResponse {
    user: UserType,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct UserType {
    username: String,
    #[serde(default)]
    attributes: Vec<AttributeType>,
    enabled: Option<bool>,
}

impl UserType {
    fn into_identity(self, groups: Vec<String>) -> Identity {
        Identity {
            handle: self.username,
            active: self.enabled.unwrap_or(true),
            attributes: from_wire_attributes(self.attributes),
            groups: groups.into_iter().collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct AdminSetUserPasswordRequest<'a> {
    user_pool_id: &'a str,
    username: &'a str,
    password: &'a str,
    permanent: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct AdminAddUserToGroupRequest<'a> {
    user_pool_id: &'a str,
    username: &'a str,
    group_name: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AdminGetUserResponse {
    username: String,
    #[serde(default)]
    user_attributes: Vec<AttributeType>,
    enabled: Option<bool>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ListUsersRequest<'a> {
    user_pool_id: &'a str,
    limit: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListUsersResponse {
    #[serde(default)]
    users: Vec<UserType>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct AdminListGroupsForUserRequest<'a> {
    user_pool_id: &'a str,
    username: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_token: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AdminListGroupsForUserResponse {
    #[serde(default)]
    groups: Vec<GroupType>,
    next_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GroupType {
    group_name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct AdminUpdateUserAttributesRequest<'a> {
    user_pool_id: &'a str,
    username: &'a str,
    user_attributes: Vec<AttributeType>,
}
