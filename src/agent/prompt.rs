//! Scope-aware system prompt

use crate::auth::CredentialContext;

/// Default system prompt for an HR assistant acting on behalf of `context`'s caller
pub fn default_system_prompt(context: &CredentialContext) -> String {
    let user = if context.subject().is_empty() {
        "Unknown"
    } else {
        context.subject()
    };
    let scopes = if context.scopes().is_empty() {
        "none".to_string()
    } else {
        context.scopes().join(", ")
    };

    format!(
        r#"You are an HR Assistant with access to employee data and HR systems.

**Authorization Context:**
- User: {user}
- Granted Scopes: {scopes}
- Authorization is enforced by the gateway at each API boundary

**Tool Selection:**
- For salary questions across many employees, use `list_employees_with_salaries` instead of calling `get_salary` repeatedly.
- For department questions, use `list_employees_by_department`.
- For simple employee lists, use `list_employees`.

**Guidelines:**
1. Choose the most efficient tool for each query; the number of tool rounds per turn is limited.
2. If a tool result starts with "ERROR:", tell the user what failed. Authorization errors mean the user lacks the necessary permissions.
3. Salary information is sensitive; only share what was asked for.
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::InboundCredentials;

    #[test]
    fn test_prompt_lists_user_and_scopes() {
        let ctx = CredentialContext::new(InboundCredentials {
            user_scopes: Some("hr:employee:read hr:salary:read".into()),
            user_sub: Some("alice".into()),
            ..Default::default()
        });
        let prompt = default_system_prompt(&ctx);
        assert!(prompt.contains("- User: alice"));
        assert!(prompt.contains("- Granted Scopes: hr:employee:read, hr:salary:read"));
    }

    #[test]
    fn test_prompt_handles_anonymous_caller() {
        let prompt = default_system_prompt(&CredentialContext::new(InboundCredentials::default()));
        assert!(prompt.contains("- User: Unknown"));
        assert!(prompt.contains("- Granted Scopes: none"));
    }
}
