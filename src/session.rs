use std::fmt;

use serde_json::Value;

pub const DEFAULT_USER_CODE: &str = "GO2025_UserAccess_7X9K";
pub const DEFAULT_ADMIN_CODE: &str = "ADMIN_Control_P4N3L_2025";
/// 服务器不应接受的访问码
pub const INVALID_CODE: &str = "INVALID_CODE_123";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessCodes {
    pub user: String,
    pub admin: String,
}

impl AccessCodes {
    pub fn for_role(&self, role: Role) -> &str {
        match role {
            Role::User => &self.user,
            Role::Admin => &self.admin,
        }
    }
}

impl Default for AccessCodes {
    fn default() -> Self {
        Self {
            user: DEFAULT_USER_CODE.to_string(),
            admin: DEFAULT_ADMIN_CODE.to_string(),
        }
    }
}

/// 探测发送哪个凭据
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// 会话当前的 token（如有）
    #[default]
    Session,
    /// 不发送 `Authorization` 头
    Anonymous,
    /// 指定角色登录得到的 token（如有）
    Role(Role),
}

/// 读取 `id` 字段：后端可能返回字符串（UUID）或数字
pub fn lenient_id(item: &Value) -> Option<String> {
    match item.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_field(item: &Value, key: &str) -> Option<String> {
    item.get(key).and_then(Value::as_str).map(str::to_string)
}

/// `auth/login` 与 `auth/me` 返回的用户信息，所有字段可选
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub id: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<String>,
}

impl UserProfile {
    /// 逐字段读取；类型不符的字段只丢弃该字段本身
    pub fn from_value(value: &Value) -> Self {
        Self {
            id: lenient_id(value),
            full_name: string_field(value, "full_name"),
            role: string_field(value, "role"),
        }
    }

    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or("Unknown")
    }

    pub fn role_name(&self) -> &str {
        self.role.as_deref().unwrap_or("Unknown")
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginResponse {
    pub access_token: Option<String>,
    pub user: Option<UserProfile>,
}

impl LoginResponse {
    /// 宽松解析登录响应：token 与用户信息相互独立，`user` 不是对象时视为缺失
    pub fn from_value(value: &Value) -> Self {
        Self {
            access_token: string_field(value, "access_token"),
            user: value
                .get("user")
                .filter(|user| user.is_object())
                .map(UserProfile::from_value),
        }
    }

    /// 非空的 bearer token
    pub fn token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Default)]
struct Credential {
    token: String,
    profile: UserProfile,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    codes: AccessCodes,
    user: Option<Credential>,
    admin: Option<Credential>,
}

impl Session {
    pub fn new(codes: AccessCodes) -> Self {
        Self {
            codes,
            user: None,
            admin: None,
        }
    }

    pub fn codes(&self) -> &AccessCodes {
        &self.codes
    }

    pub fn store(&mut self, role: Role, token: impl Into<String>, profile: UserProfile) {
        let credential = Credential {
            token: token.into(),
            profile,
        };
        match role {
            Role::User => self.user = Some(credential),
            Role::Admin => self.admin = Some(credential),
        }
    }

    fn credential(&self, role: Role) -> Option<&Credential> {
        match role {
            Role::User => self.user.as_ref(),
            Role::Admin => self.admin.as_ref(),
        }
    }

    pub fn token(&self, role: Role) -> Option<&str> {
        self.credential(role).map(|c| c.token.as_str())
    }

    pub fn profile(&self, role: Role) -> Option<&UserProfile> {
        self.credential(role).map(|c| &c.profile)
    }

    pub fn is_logged_in(&self, role: Role) -> bool {
        self.credential(role).is_some()
    }

    /// `AuthMode::Session` 使用的 token，即 user token
    pub fn active_token(&self) -> Option<&str> {
        self.token(Role::User)
    }

    pub fn bearer_for(&self, mode: AuthMode) -> Option<&str> {
        match mode {
            AuthMode::Session => self.active_token(),
            AuthMode::Anonymous => None,
            AuthMode::Role(role) => self.token(role),
        }
    }
}
