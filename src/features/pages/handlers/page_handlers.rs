use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use minijinja::context;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::error::AppError;
use crate::core::extractor::AppQuery;
use crate::core::middleware::{session_token, SESSION_COOKIE};
use crate::features::admin::dtos::{BannerRequestDto, EntryFormData, EntryRequestDto};
use crate::features::admin::services::AdminService;
use crate::features::auth::dtos::LoginRequestDto;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::AuthService;
use crate::features::banners::services::BannerService;
use crate::features::catalog::dtos::{CatalogQueryDto, CatalogViewDto, EntryCardDto};
use crate::features::catalog::services::CatalogService;
use crate::shared::constants::FEATURED_LABELS;
use crate::shared::templates::render_page;
use crate::shared::validation::validation_messages;

/// Everything the server-rendered pages need
pub struct PagesState {
    pub catalog: Arc<CatalogService>,
    pub banners: Arc<BannerService>,
    pub admin: Arc<AdminService>,
    pub auth: Arc<AuthService>,
    /// Mark the session cookie `Secure`
    pub secure_cookies: bool,
}

/// Page failure, rendered as an HTML error page
#[derive(Debug)]
pub struct PageError(AppError);

impl From<AppError> for PageError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        render(
            status,
            "error.html",
            context! {
                status => status.as_u16(),
                message => self.0.public_message(),
            },
        )
    }
}

type PageResult = std::result::Result<Response, PageError>;

#[derive(Debug, Default, Deserialize)]
pub struct NoticeQuery {
    pub notice: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// A listed item plus its id encoded for use in a URL path
#[derive(Serialize)]
struct Row<'a, T: Serialize> {
    #[serde(flatten)]
    item: &'a T,
    path_id: String,
}

fn rows<'a, T: Serialize>(items: &'a [T], id: impl Fn(&T) -> &str) -> Vec<Row<'a, T>> {
    items
        .iter()
        .map(|item| Row {
            path_id: urlencoding::encode(id(item)).into_owned(),
            item,
        })
        .collect()
}

fn render(status: StatusCode, template: &str, ctx: minijinja::Value) -> Response {
    match render_page(template, ctx) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render {}: {}", template, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

fn redirect_with_notice(path: &str, notice: &str) -> Response {
    Redirect::to(&format!("{}?notice={}", path, urlencoding::encode(notice))).into_response()
}

fn require_admin(user: &AuthenticatedUser) -> Result<(), PageError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Your account does not have access to the admin panel.".to_string()).into())
    }
}

fn session_cookie(token: &str, max_age: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE, token, max_age
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

// =============================================================================
// PUBLIC PAGES
// =============================================================================

/// Home: banner carousel, filters and the matching tool cards
pub async fn home(
    State(state): State<Arc<PagesState>>,
    headers: HeaderMap,
    AppQuery(query): AppQuery<CatalogQueryDto>,
) -> Response {
    let view: CatalogViewDto = state.catalog.query(query.to_filter()).await.into();

    let banners = state.banners.list().await.unwrap_or_else(|e| {
        tracing::warn!("Failed to load banners: {}", e);
        Vec::new()
    });

    render(
        StatusCode::OK,
        "home.html",
        context! {
            signed_in => session_token(&headers).is_some(),
            notice => view.notice,
            categories => view.categories,
            entries => view.entries,
            filter => view.filter,
            featured_labels => FEATURED_LABELS,
            banners => banners,
        },
    )
}

/// Tool detail page
pub async fn tool_detail(
    State(state): State<Arc<PagesState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> PageResult {
    let (entry, notice) = state.catalog.find(&id).await;
    let entry = entry.ok_or_else(|| {
        AppError::NotFound(
            notice.unwrap_or_else(|| "We couldn't find the tool you're looking for.".to_string()),
        )
    })?;

    Ok(render(
        StatusCode::OK,
        "tool.html",
        context! {
            signed_in => session_token(&headers).is_some(),
            details => entry.details.clone(),
            entry => EntryCardDto::from(&entry),
        },
    ))
}

pub async fn login_page(AppQuery(query): AppQuery<NoticeQuery>) -> Response {
    render(
        StatusCode::OK,
        "login.html",
        context! { notice => query.notice, email => "" },
    )
}

/// Sign in and store the ID token in the session cookie
pub async fn login_submit(
    State(state): State<Arc<PagesState>>,
    Form(form): Form<LoginForm>,
) -> Response {
    let email = form.email.trim().to_string();
    let failed = |status: StatusCode, errors: Vec<String>| {
        render(
            status,
            "login.html",
            context! { email => email.clone(), errors => errors },
        )
    };

    let dto = LoginRequestDto {
        email: email.clone(),
        password: form.password,
    };
    if let Err(e) = dto.validate() {
        return failed(StatusCode::BAD_REQUEST, validation_messages(&e));
    }

    match state.auth.login(dto).await {
        Ok(session) if session.user.is_admin => {
            tracing::info!(uid = %session.user.uid, "Admin signed in");
            let cookie = session_cookie(
                &session.access_token,
                session.expires_in,
                state.secure_cookies,
            );
            ([(header::SET_COOKIE, cookie)], Redirect::to("/admin")).into_response()
        }
        Ok(session) => {
            tracing::warn!(uid = %session.user.uid, "Sign-in without admin access");
            failed(
                StatusCode::FORBIDDEN,
                vec!["This account does not have access to the admin panel.".to_string()],
            )
        }
        Err(e) => failed(e.status_code(), vec![e.public_message()]),
    }
}

pub async fn logout(State(state): State<Arc<PagesState>>) -> Response {
    let cookie = session_cookie("", 0, state.secure_cookies);
    (
        [(header::SET_COOKIE, cookie)],
        Redirect::to("/login?notice=You+have+been+signed+out."),
    )
        .into_response()
}

// =============================================================================
// ADMIN PAGES
// =============================================================================

struct AdminPage {
    notice: Option<String>,
    errors: Vec<String>,
    form: EntryFormData,
    banner_form: BannerRequestDto,
    status: StatusCode,
}

impl Default for AdminPage {
    fn default() -> Self {
        Self {
            notice: None,
            errors: Vec::new(),
            form: EntryFormData::default(),
            banner_form: BannerRequestDto::default(),
            status: StatusCode::OK,
        }
    }
}

async fn render_admin(state: &PagesState, user: &AuthenticatedUser, page: AdminPage) -> PageResult {
    let entries = state.admin.list_entries().await?;
    let banners = state.admin.list_banners().await?;

    Ok(render(
        page.status,
        "admin.html",
        context! {
            signed_in => true,
            user_email => user.email.clone(),
            notice => page.notice,
            errors => page.errors,
            entries => rows(&entries, |e| e.id.as_str()),
            banners => rows(&banners, |b| b.id.as_str()),
            form => page.form,
            banner_form => page.banner_form,
            action => "/admin/tools",
            submit_label => "Add tool",
        },
    ))
}

fn render_edit(id: &str, form: EntryFormData, errors: Vec<String>, status: StatusCode) -> Response {
    render(
        status,
        "edit.html",
        context! {
            signed_in => true,
            entry_id => id,
            form => form,
            errors => errors,
            action => format!("/admin/tools/{}", urlencoding::encode(id)),
            submit_label => "Save changes",
        },
    )
}

/// Admin panel: add form, tool table and banner management
pub async fn admin_panel(
    user: AuthenticatedUser,
    State(state): State<Arc<PagesState>>,
    AppQuery(query): AppQuery<NoticeQuery>,
) -> PageResult {
    require_admin(&user)?;
    render_admin(
        &state,
        &user,
        AdminPage {
            notice: query.notice,
            ..Default::default()
        },
    )
    .await
}

pub async fn edit_entry_page(
    user: AuthenticatedUser,
    State(state): State<Arc<PagesState>>,
    Path(id): Path<String>,
) -> PageResult {
    require_admin(&user)?;
    let entry = state.admin.get_entry(&id).await?;
    Ok(render_edit(
        &id,
        EntryFormData::from(&entry),
        Vec::new(),
        StatusCode::OK,
    ))
}

pub async fn create_entry(
    user: AuthenticatedUser,
    State(state): State<Arc<PagesState>>,
    Form(form): Form<EntryFormData>,
) -> PageResult {
    require_admin(&user)?;

    match state.admin.create_entry(EntryRequestDto::from(form.clone())).await {
        Ok(entry) => Ok(redirect_with_notice(
            "/admin",
            &format!("Added \"{}\".", entry.name),
        )),
        Err(AppError::InvalidFields(errors)) => {
            render_admin(
                &state,
                &user,
                AdminPage {
                    errors,
                    form,
                    status: StatusCode::BAD_REQUEST,
                    ..Default::default()
                },
            )
            .await
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn update_entry(
    user: AuthenticatedUser,
    State(state): State<Arc<PagesState>>,
    Path(id): Path<String>,
    Form(form): Form<EntryFormData>,
) -> PageResult {
    require_admin(&user)?;

    match state
        .admin
        .update_entry(&id, EntryRequestDto::from(form.clone()))
        .await
    {
        Ok(entry) => Ok(redirect_with_notice(
            "/admin",
            &format!("Updated \"{}\".", entry.name),
        )),
        Err(AppError::InvalidFields(errors)) => {
            Ok(render_edit(&id, form, errors, StatusCode::BAD_REQUEST))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn delete_entry(
    user: AuthenticatedUser,
    State(state): State<Arc<PagesState>>,
    Path(id): Path<String>,
) -> PageResult {
    require_admin(&user)?;

    let notice = match state.admin.delete_entry(&id).await {
        Ok(()) => "Tool deleted.".to_string(),
        Err(AppError::NotFound(_)) => "That tool was already deleted.".to_string(),
        Err(e) => return Err(e.into()),
    };
    Ok(redirect_with_notice("/admin", &notice))
}

pub async fn create_banner(
    user: AuthenticatedUser,
    State(state): State<Arc<PagesState>>,
    Form(form): Form<BannerRequestDto>,
) -> PageResult {
    require_admin(&user)?;

    match state.admin.create_banner(form.clone()).await {
        Ok(_) => Ok(redirect_with_notice("/admin", "Banner added.")),
        Err(AppError::InvalidFields(errors)) => {
            render_admin(
                &state,
                &user,
                AdminPage {
                    errors,
                    banner_form: form,
                    status: StatusCode::BAD_REQUEST,
                    ..Default::default()
                },
            )
            .await
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn delete_banner(
    user: AuthenticatedUser,
    State(state): State<Arc<PagesState>>,
    Path(id): Path<String>,
) -> PageResult {
    require_admin(&user)?;

    let notice = match state.admin.delete_banner(&id).await {
        Ok(()) => "Banner deleted.".to_string(),
        Err(AppError::NotFound(_)) => "That banner was already deleted.".to_string(),
        Err(e) => return Err(e.into()),
    };
    Ok(redirect_with_notice("/admin", &notice))
}
