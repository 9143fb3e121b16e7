//! Ordered guard pipeline over `(request) -> context | failure`.

use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use corehr_core::error::AppError;
use corehr_core::traits::EmployeeDirectory;
use corehr_entity::user::UserRole;

use crate::token::TokenService;

use super::context::RequestContext;
use super::request::GuardRequest;

/// One step of the guard pipeline.
///
/// Steps run strictly in declaration order and short-circuit on the first
/// failure. `Authenticate` must precede every authorization step; an
/// authorization step reached without a context fails with 401.
#[derive(Debug, Clone)]
pub enum GuardStep {
    /// Verify the bearer token and derive the request context.
    Authenticate,
    /// Require the authenticated role to be one of the listed roles.
    RequireRole(Vec<UserRole>),
    /// Require the named path parameter to equal the caller's user ID.
    /// ADMIN and HR bypass this check.
    RequireResourceOwner {
        /// Name of the path parameter carrying the resource's user ID.
        param: &'static str,
    },
    /// Require the named path parameter to identify the caller's own
    /// employee record or, for MANAGER, an employee in the caller's
    /// reporting chain. ADMIN and HR bypass this check.
    RequireManager {
        /// Name of the path parameter carrying the employee ID.
        param: &'static str,
    },
}

/// The request guard: authentication followed by authorization checks,
/// composed as an explicit ordered list.
pub struct GuardPipeline {
    tokens: Arc<TokenService>,
    directory: Arc<dyn EmployeeDirectory>,
    steps: Vec<GuardStep>,
}

impl std::fmt::Debug for GuardPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardPipeline")
            .field("steps", &self.steps)
            .finish()
    }
}

impl GuardPipeline {
    /// Creates a pipeline with the given ordered steps.
    pub fn new(
        tokens: Arc<TokenService>,
        directory: Arc<dyn EmployeeDirectory>,
        steps: Vec<GuardStep>,
    ) -> Self {
        Self {
            tokens,
            directory,
            steps,
        }
    }

    /// The ordered steps this pipeline will apply.
    pub fn steps(&self) -> &[GuardStep] {
        &self.steps
    }

    /// Runs every step in order, short-circuiting on the first failure.
    ///
    /// Returns the request context derived by `Authenticate` once all
    /// checks have passed.
    pub async fn authorize(&self, request: &GuardRequest) -> Result<RequestContext, AppError> {
        let mut context: Option<RequestContext> = None;

        for step in &self.steps {
            context = Some(self.apply(step, request, context).await?);
        }

        context.ok_or_else(|| AppError::internal("Guard pipeline has no steps"))
    }

    async fn apply(
        &self,
        step: &GuardStep,
        request: &GuardRequest,
        context: Option<RequestContext>,
    ) -> Result<RequestContext, AppError> {
        match step {
            GuardStep::Authenticate => self.authenticate(request),
            GuardStep::RequireRole(allowed) => {
                let context = require_authenticated(context)?;
                if allowed.contains(&context.role) {
                    Ok(context)
                } else {
                    warn!(
                        user_id = %context.user_id,
                        role = %context.role,
                        "Role check failed"
                    );
                    Err(AppError::authorization("Insufficient permissions"))
                }
            }
            GuardStep::RequireResourceOwner { param } => {
                let context = require_authenticated(context)?;
                if context.bypasses_ownership() {
                    return Ok(context);
                }

                let target = required_uuid_param(request, param)?;
                if target == context.user_id {
                    Ok(context)
                } else {
                    warn!(
                        user_id = %context.user_id,
                        requested = %target,
                        "Resource ownership check failed"
                    );
                    Err(AppError::authorization("Access denied to this resource"))
                }
            }
            GuardStep::RequireManager { param } => {
                let context = require_authenticated(context)?;
                if context.bypasses_ownership() {
                    return Ok(context);
                }

                let target = required_uuid_param(request, param)?;
                self.check_manager_access(context, target).await
            }
        }
    }

    /// Extracts and verifies the bearer token, producing the context.
    ///
    /// The specific rejection reason is logged but not surfaced; callers
    /// see one uniform authentication failure.
    fn authenticate(&self, request: &GuardRequest) -> Result<RequestContext, AppError> {
        let token = request
            .bearer_token
            .as_deref()
            .ok_or_else(|| AppError::authentication("Access token is required"))?;

        let claims = self.tokens.verify_access_token(token).map_err(|e| {
            warn!(error = %e, ip = %request.ip_address, "Access token rejected");
            AppError::authentication("Invalid or expired access token")
        })?;

        Ok(RequestContext::from_claims(
            &claims,
            request.ip_address.clone(),
            request.user_agent.clone(),
        ))
    }

    /// Manager-or-owner rule for employee-scoped resources.
    ///
    /// A MANAGER must actually supervise the target employee — the
    /// directory lookup decides; an absent employee link or a negative
    /// answer denies access. Other roles only reach their own record.
    async fn check_manager_access(
        &self,
        context: RequestContext,
        target: Uuid,
    ) -> Result<RequestContext, AppError> {
        if context.employee_id == Some(target) {
            return Ok(context);
        }

        if context.role == UserRole::Manager {
            let own = context.employee_id.ok_or_else(|| {
                warn!(user_id = %context.user_id, "Manager has no linked employee record");
                AppError::authorization("Access denied to this employee record")
            })?;

            if self.directory.is_manager_of(own, target).await? {
                return Ok(context);
            }
        }

        warn!(
            user_id = %context.user_id,
            requested_employee = %target,
            "Employee access check failed"
        );
        Err(AppError::authorization(
            "Access denied to this employee record",
        ))
    }
}

fn require_authenticated(context: Option<RequestContext>) -> Result<RequestContext, AppError> {
    context.ok_or_else(|| AppError::authentication("Authentication required"))
}

/// Fail-closed parameter extraction: a missing or unparseable identifier
/// denies access rather than granting it.
fn required_uuid_param(request: &GuardRequest, param: &str) -> Result<Uuid, AppError> {
    request
        .param(param)
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .ok_or_else(|| AppError::authorization("Access denied to this resource"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use corehr_core::config::auth::AuthConfig;
    use corehr_core::error::ErrorKind;
    use corehr_core::result::AppResult;
    use corehr_entity::user::User;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Directory stub: one fixed manager/report pair, with a flag recording
    /// whether it was consulted.
    struct StubDirectory {
        manager: Uuid,
        report: Uuid,
        consulted: AtomicBool,
    }

    #[async_trait]
    impl EmployeeDirectory for StubDirectory {
        async fn is_manager_of(&self, manager: Uuid, employee: Uuid) -> AppResult<bool> {
            self.consulted.store(true, Ordering::SeqCst);
            Ok(manager == self.manager && employee == self.report)
        }
    }

    struct Fixture {
        tokens: Arc<TokenService>,
        directory: Arc<StubDirectory>,
        manager_employee: Uuid,
        report_employee: Uuid,
    }

    impl Fixture {
        fn new() -> Self {
            let manager_employee = Uuid::new_v4();
            let report_employee = Uuid::new_v4();
            Self {
                tokens: Arc::new(TokenService::new(&AuthConfig::default())),
                directory: Arc::new(StubDirectory {
                    manager: manager_employee,
                    report: report_employee,
                    consulted: AtomicBool::new(false),
                }),
                manager_employee,
                report_employee,
            }
        }

        fn pipeline(&self, steps: Vec<GuardStep>) -> GuardPipeline {
            GuardPipeline::new(
                Arc::clone(&self.tokens),
                self.directory.clone() as Arc<dyn EmployeeDirectory>,
                steps,
            )
        }

        fn token_for(&self, role: UserRole, employee_id: Option<Uuid>) -> (Uuid, String) {
            let now = Utc::now();
            let user = User {
                id: Uuid::new_v4(),
                name: "Pipeline Test".to_string(),
                email: "pipeline@corehr.dev".to_string(),
                password_hash: String::new(),
                role,
                is_active: true,
                two_factor_enabled: false,
                two_factor_secret: None,
                employee_id,
                last_login_at: None,
                created_at: now,
                updated_at: now,
            };
            let (token, _) = self.tokens.issue_access_token(&user).unwrap();
            (user.id, token)
        }
    }

    #[tokio::test]
    async fn test_missing_token_fails_authentication() {
        let fx = Fixture::new();
        let pipeline = fx.pipeline(vec![GuardStep::Authenticate]);

        let err = pipeline.authorize(&GuardRequest::new()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[tokio::test]
    async fn test_role_check_passes_and_denies() {
        let fx = Fixture::new();
        let pipeline = fx.pipeline(vec![
            GuardStep::Authenticate,
            GuardStep::RequireRole(vec![UserRole::Admin, UserRole::Hr]),
        ]);

        let (_, hr_token) = fx.token_for(UserRole::Hr, None);
        let request = GuardRequest::new().with_bearer(hr_token);
        assert!(pipeline.authorize(&request).await.is_ok());

        let (_, employee_token) = fx.token_for(UserRole::Employee, None);
        let request = GuardRequest::new().with_bearer(employee_token);
        let err = pipeline.authorize(&request).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }

    #[tokio::test]
    async fn test_authorization_without_authentication_is_401() {
        let fx = Fixture::new();
        // Misconfigured pipeline: no Authenticate step.
        let pipeline = fx.pipeline(vec![GuardStep::RequireRole(vec![UserRole::Admin])]);

        let err = pipeline.authorize(&GuardRequest::new()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[tokio::test]
    async fn test_owner_check_per_role() {
        let fx = Fixture::new();
        let pipeline = fx.pipeline(vec![
            GuardStep::Authenticate,
            GuardStep::RequireResourceOwner { param: "user_id" },
        ]);

        // An employee may reach their own record…
        let (user_id, token) = fx.token_for(UserRole::Employee, None);
        let request = GuardRequest::new()
            .with_bearer(token.as_str())
            .with_param("user_id", user_id.to_string());
        assert!(pipeline.authorize(&request).await.is_ok());

        // …but not anyone else's.
        let request = GuardRequest::new()
            .with_bearer(token.as_str())
            .with_param("user_id", Uuid::new_v4().to_string());
        let err = pipeline.authorize(&request).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        // Managers get no bypass either.
        let (_, manager_token) = fx.token_for(UserRole::Manager, Some(fx.manager_employee));
        let request = GuardRequest::new()
            .with_bearer(manager_token)
            .with_param("user_id", Uuid::new_v4().to_string());
        assert!(pipeline.authorize(&request).await.is_err());

        // ADMIN and HR always pass.
        for role in [UserRole::Admin, UserRole::Hr] {
            let (_, token) = fx.token_for(role, None);
            let request = GuardRequest::new()
                .with_bearer(token)
                .with_param("user_id", Uuid::new_v4().to_string());
            assert!(pipeline.authorize(&request).await.is_ok());
        }
    }

    #[tokio::test]
    async fn test_manager_check_consults_directory() {
        let fx = Fixture::new();
        let pipeline = fx.pipeline(vec![
            GuardStep::Authenticate,
            GuardStep::RequireManager {
                param: "employee_id",
            },
        ]);

        let (_, token) = fx.token_for(UserRole::Manager, Some(fx.manager_employee));

        // Supervised employee: allowed.
        let request = GuardRequest::new()
            .with_bearer(token.as_str())
            .with_param("employee_id", fx.report_employee.to_string());
        assert!(pipeline.authorize(&request).await.is_ok());
        assert!(fx.directory.consulted.load(Ordering::SeqCst));

        // Unrelated employee: denied.
        let request = GuardRequest::new()
            .with_bearer(token.as_str())
            .with_param("employee_id", Uuid::new_v4().to_string());
        let err = pipeline.authorize(&request).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }

    #[tokio::test]
    async fn test_manager_without_employee_link_is_denied() {
        let fx = Fixture::new();
        let pipeline = fx.pipeline(vec![
            GuardStep::Authenticate,
            GuardStep::RequireManager {
                param: "employee_id",
            },
        ]);

        let (_, token) = fx.token_for(UserRole::Manager, None);
        let request = GuardRequest::new()
            .with_bearer(token)
            .with_param("employee_id", fx.report_employee.to_string());
        let err = pipeline.authorize(&request).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }

    #[tokio::test]
    async fn test_failed_authentication_short_circuits() {
        let fx = Fixture::new();
        let pipeline = fx.pipeline(vec![
            GuardStep::Authenticate,
            GuardStep::RequireManager {
                param: "employee_id",
            },
        ]);

        let request = GuardRequest::new()
            .with_bearer("garbage")
            .with_param("employee_id", fx.report_employee.to_string());
        let err = pipeline.authorize(&request).await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::Authentication);
        // The ownership step never ran.
        assert!(!fx.directory.consulted.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_missing_param_fails_closed() {
        let fx = Fixture::new();
        let pipeline = fx.pipeline(vec![
            GuardStep::Authenticate,
            GuardStep::RequireResourceOwner { param: "user_id" },
        ]);

        let (_, token) = fx.token_for(UserRole::Employee, None);
        let request = GuardRequest::new().with_bearer(token);
        let err = pipeline.authorize(&request).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }
}
