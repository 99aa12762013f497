//! HTTP Handlers

use axum::Json;
use axum::extract::{Extension, Form, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use std::sync::Arc;

use crate::application::config::GateConfig;
use crate::application::role_cache::{CachedRoleDirectory, RoleCache};
use crate::application::{SignInInput, SignInUseCase, SignOutUseCase};
use crate::domain::capability::can_open_page;
use crate::domain::entity::portal_definition::PortalDefinition;
use crate::domain::repository::{IdentityProvider, RoleDirectory};
use crate::error::{GateError, GateResult};
use crate::presentation::dto::{HomeView, LoginForm, LoginPage, NavLink, PageView, PortalLink};
use crate::presentation::middleware::PortalAccess;
use crate::presentation::registry::PortalRegistry;

/// Shared state for gate handlers
pub struct GateAppState<P, D> {
    pub provider: Arc<P>,
    /// Role directory behind the (possibly disabled) role cache
    pub directory: Arc<CachedRoleDirectory<D>>,
    pub cache: Arc<RoleCache>,
    pub config: Arc<GateConfig>,
    pub registry: Arc<PortalRegistry>,
}

impl<P, D> GateAppState<P, D> {
    pub fn new(provider: P, directory: D, config: GateConfig, registry: PortalRegistry) -> Self {
        let cache = Arc::new(RoleCache::new(config.role_cache_ttl));
        Self {
            provider: Arc::new(provider),
            directory: Arc::new(CachedRoleDirectory::new(Arc::new(directory), cache.clone())),
            cache,
            config: Arc::new(config),
            registry: Arc::new(registry),
        }
    }
}

impl<P, D> Clone for GateAppState<P, D> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            directory: self.directory.clone(),
            cache: self.cache.clone(),
            config: self.config.clone(),
            registry: self.registry.clone(),
        }
    }
}

/// State of one portal's routes
pub struct PortalState<P, D> {
    pub app: GateAppState<P, D>,
    pub portal: Arc<PortalDefinition>,
}

impl<P, D> Clone for PortalState<P, D> {
    fn clone(&self) -> Self {
        Self {
            app: self.app.clone(),
            portal: self.portal.clone(),
        }
    }
}

// ============================================================================
// Home
// ============================================================================

/// GET /
pub async fn home(State(registry): State<Arc<PortalRegistry>>) -> Json<HomeView> {
    let portals = registry
        .iter()
        .map(|def| PortalLink {
            portal: def.id,
            title: def.id.title().to_string(),
            login_path: def.login_path.clone(),
        })
        .collect();

    Json(HomeView { portals })
}

// ============================================================================
// Login
// ============================================================================

fn login_page(portal: &PortalDefinition, error: Option<String>) -> LoginPage {
    LoginPage {
        portal: portal.id,
        title: portal.id.title().to_string(),
        action: portal.login_path.clone(),
        error,
    }
}

/// GET /{portal}/login
pub async fn show_login<P, D>(State(state): State<PortalState<P, D>>) -> Json<LoginPage>
where
    P: IdentityProvider + Send + Sync + 'static,
    D: RoleDirectory + Send + Sync + 'static,
{
    Json(login_page(&state.portal, None))
}

/// POST /{portal}/login
pub async fn submit_login<P, D>(
    State(state): State<PortalState<P, D>>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response
where
    P: IdentityProvider + Send + Sync + 'static,
    D: RoleDirectory + Send + Sync + 'static,
{
    let use_case = SignInUseCase::new(
        state.app.provider.clone(),
        state.app.cache.clone(),
        state.app.config.clone(),
    );

    let input = SignInInput {
        email: form.email,
        password: form.password,
        session_cookie: platform::cookie::extract_cookie(
            &headers,
            &state.app.config.session_cookie_name,
        ),
    };

    match use_case.execute(input).await {
        Ok(output) => {
            let cookie = state.app.config.cookie().build_set_cookie(&output.session_cookie);
            (
                StatusCode::SEE_OTHER,
                [
                    (header::LOCATION, state.portal.default_path()),
                    (header::SET_COOKIE, cookie),
                ],
            )
                .into_response()
        }
        Err(e @ GateError::InvalidCredentials) => {
            e.log();
            (
                StatusCode::UNAUTHORIZED,
                Json(login_page(&state.portal, Some(e.to_string()))),
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// POST /{portal}/logout
pub async fn logout<P, D>(State(state): State<PortalState<P, D>>, headers: HeaderMap) -> Response
where
    P: IdentityProvider + Send + Sync + 'static,
    D: RoleDirectory + Send + Sync + 'static,
{
    let token = platform::cookie::extract_cookie(&headers, &state.app.config.session_cookie_name);

    if let Some(token) = token {
        let use_case = SignOutUseCase::new(
            state.app.provider.clone(),
            state.app.cache.clone(),
            state.app.config.clone(),
        );
        // The cookie is cleared either way
        if let Err(e) = use_case.execute(&token).await {
            e.log();
        }
    }

    let cookie = state.app.config.cookie().build_delete_cookie();

    (
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, state.portal.login_path.clone()),
            (header::SET_COOKIE, cookie),
        ],
    )
        .into_response()
}

// ============================================================================
// Protected Pages
// ============================================================================

/// GET /{portal}
pub async fn index<P, D>(State(state): State<PortalState<P, D>>) -> Redirect
where
    P: IdentityProvider + Send + Sync + 'static,
    D: RoleDirectory + Send + Sync + 'static,
{
    Redirect::to(&state.portal.default_path())
}

/// GET /{portal}/{page}
pub async fn page<P, D>(
    State(state): State<PortalState<P, D>>,
    Path(page): Path<String>,
    Extension(access): Extension<PortalAccess>,
) -> GateResult<Response>
where
    P: IdentityProvider + Send + Sync + 'static,
    D: RoleDirectory + Send + Sync + 'static,
{
    let portal = &state.portal;

    if !portal.has_page(&page) {
        return Err(GateError::PageNotFound(portal.page_path(&page)));
    }

    // Restricted entries are enforced here too, not only hidden from the nav
    if !can_open_page(access.role, portal.id, &page) {
        tracing::info!(
            portal = %portal.id,
            page = %page,
            role = %access.role,
            "Page not available to role"
        );
        return Ok(Redirect::to(&portal.default_path()).into_response());
    }

    let nav = portal
        .pages
        .iter()
        .filter(|entry| can_open_page(access.role, portal.id, entry))
        .map(|entry| NavLink {
            page: entry.to_string(),
            path: portal.page_path(entry),
        })
        .collect();

    Ok(Json(PageView {
        portal: portal.id,
        title: portal.id.title().to_string(),
        page,
        uid: access.uid.to_string(),
        role: access.role,
        nav,
        logout_action: format!("{}/logout", portal.path_prefix),
    })
    .into_response())
}
