//! Company users
//!
//! Each company using the system is represented by its user record. The
//! `status` field is the hard access switch: `inativo` blocks the whole
//! application for that company until an admin turns it back on.

use std::fmt;

use serde::{Deserialize, Serialize};

use core_kernel::{Actor, CompanyId, Entity, Role, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Ativo,
    Inativo,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Ativo => "ativo",
            UserStatus::Inativo => "inativo",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub company_id: CompanyId,
    pub company_name: String,
    pub role: Role,
    pub status: UserStatus,
    #[serde(default)]
    pub terms_accepted: bool,
}

impl Entity for User {
    type Id = UserId;
    const ENTITY_NAME: &'static str = "Usuario";

    fn id(&self) -> UserId {
        self.id
    }
}

impl User {
    /// Creates an active, non-admin user for a new company
    pub fn new(email: impl Into<String>, company_name: impl Into<String>) -> Self {
        Self {
            id: UserId::new_v7(),
            email: email.into(),
            company_id: CompanyId::new_v7(),
            company_name: company_name.into(),
            role: Role::User,
            status: UserStatus::Ativo,
            terms_accepted: false,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn with_company(mut self, company_id: CompanyId) -> Self {
        self.company_id = company_id;
        self
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_blocked(&self) -> bool {
        self.status == UserStatus::Inativo
    }

    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.role)
    }

    pub fn accept_terms(&mut self) {
        self.terms_accepted = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_is_active_user_role() {
        let user = User::new("contato@padaria.com.br", "Padaria Estrela");
        assert_eq!(user.status, UserStatus::Ativo);
        assert_eq!(user.role, Role::User);
        assert!(!user.is_blocked());
        assert!(!user.terms_accepted);
    }

    #[test]
    fn test_user_serializes_camel_case() {
        let user = User::new("a@b.com", "ACME").with_role(Role::Admin);
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["companyName"], "ACME");
        assert_eq!(json["role"], "admin");
        assert_eq!(json["status"], "ativo");
        assert_eq!(json["termsAccepted"], false);
    }

    #[test]
    fn test_terms_default_when_missing() {
        let user = User::new("a@b.com", "ACME");
        let mut json = serde_json::to_value(&user).unwrap();
        json.as_object_mut().unwrap().remove("termsAccepted");
        let parsed: User = serde_json::from_value(json).unwrap();
        assert!(!parsed.terms_accepted);
    }
}
