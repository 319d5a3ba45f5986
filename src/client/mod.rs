//! Typed client for the Bookdesk REST API
//!
//! Every call returns `ClientResult<T>`: the success envelope's payload, or a
//! [`ClientError`] decoded from the failure envelope. The bearer token is
//! taken from the [`SessionStore`]; a 401 on an authenticated call clears the
//! stored session and surfaces as [`ClientError::SessionExpired`], while a
//! 401 on a call made without a session is an ordinary authentication error.

pub mod error;
pub mod session;

use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};

use crate::api::health::HealthResponse;
use crate::error::ErrorCode;
use crate::models::{
    book::{BookQuery, CreateBook, UpdateBook},
    copy::{CreateCopy, UpdateCopy},
    loan::{IssueLoan, LoanQuery, ReturnLoan},
    member::{CreateMember, MemberQuery, UpdateMember},
    reservation::{CreateReservation, ReservationQuery},
    user::{ChangePassword, LoginRequest, LoginResponse, UpdateProfile},
    Activity, Book, BookCopy, DashboardStats, Envelope, Loan, Member, Page, Reservation, User,
};

pub use error::{ClientError, ClientResult};
pub use session::{Session, SessionStore};

const USER_AGENT: &str = concat!("bookdesk-client/", env!("CARGO_PKG_VERSION"));

/// Client connection settings
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, e.g. `http://localhost:8080/api/v1`
    pub base_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Failure envelope as sent by the server
#[derive(Debug, Deserialize)]
struct FailureBody {
    error: Option<ErrorCode>,
    #[serde(default)]
    message: Option<String>,
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(config: ClientConfig, session: SessionStore) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.token().await.is_some()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    /// Send a request and decode its envelope
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<Envelope<T>> {
        let token = self.session.token().await;
        let authenticated = token.is_some();
        let request = match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED && authenticated {
            tracing::warn!("Server rejected the session token, signing out");
            self.session.clear().await?;
            return Err(ClientError::SessionExpired);
        }

        decode(response).await
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let envelope = self.send::<T>(request).await?;
        envelope.data.ok_or_else(|| ClientError::Rejected {
            status: StatusCode::OK.as_u16(),
            code: None,
            message: "Response carried no data".to_string(),
        })
    }

    /// Send a request whose envelope carries no payload, returning its message
    async fn execute(&self, request: RequestBuilder) -> ClientResult<Option<String>> {
        let envelope = self.send::<serde_json::Value>(request).await?;
        Ok(envelope.message)
    }

    // Authentication

    /// Sign in and persist the session
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<User> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        // No bearer token and no session handling: a 401 here means bad credentials
        let response = self.request(Method::POST, "/auth/login").json(&body).send().await?;
        let envelope: Envelope<LoginResponse> = decode(response).await?;
        let login = envelope.data.ok_or_else(|| ClientError::Rejected {
            status: StatusCode::OK.as_u16(),
            code: None,
            message: "Login response carried no data".to_string(),
        })?;

        self.session
            .save(Session {
                auth_token: login.token,
                user: login.user.clone(),
            })
            .await?;
        tracing::info!("Signed in as {}", login.user.email);
        Ok(login.user)
    }

    /// Revoke the token server-side and drop the local session
    pub async fn logout(&self) -> ClientResult<()> {
        if !self.is_authenticated().await {
            return Ok(());
        }
        let result = self.execute(self.request(Method::POST, "/auth/logout")).await;
        self.session.clear().await?;
        match result {
            Ok(_) | Err(ClientError::SessionExpired) => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub async fn me(&self) -> ClientResult<User> {
        let user: User = self.fetch(self.request(Method::GET, "/auth/me")).await?;
        self.session.update_user(user.clone()).await?;
        Ok(user)
    }

    pub async fn update_profile(&self, profile: &UpdateProfile) -> ClientResult<User> {
        let user: User = self
            .fetch(self.request(Method::PUT, "/auth/profile").json(profile))
            .await?;
        self.session.update_user(user.clone()).await?;
        Ok(user)
    }

    pub async fn change_password(&self, current_password: &str, new_password: &str) -> ClientResult<()> {
        let body = ChangePassword {
            current_password: current_password.to_string(),
            new_password: new_password.to_string(),
        };
        self.execute(self.request(Method::PUT, "/auth/password").json(&body))
            .await?;
        Ok(())
    }

    // Catalog

    pub async fn list_books(&self, query: &BookQuery) -> ClientResult<Page<Book>> {
        self.fetch(self.request(Method::GET, "/books").query(query)).await
    }

    pub async fn categories(&self) -> ClientResult<Vec<String>> {
        self.fetch(self.request(Method::GET, "/books/categories")).await
    }

    pub async fn get_book(&self, id: &str) -> ClientResult<Book> {
        self.fetch(self.request(Method::GET, &format!("/books/{}", id)))
            .await
    }

    pub async fn create_book(&self, book: &CreateBook) -> ClientResult<Book> {
        self.fetch(self.request(Method::POST, "/books").json(book)).await
    }

    pub async fn update_book(&self, id: &str, changes: &UpdateBook) -> ClientResult<Book> {
        self.fetch(self.request(Method::PUT, &format!("/books/{}", id)).json(changes))
            .await
    }

    pub async fn delete_book(&self, id: &str) -> ClientResult<()> {
        self.execute(self.request(Method::DELETE, &format!("/books/{}", id)))
            .await?;
        Ok(())
    }

    pub async fn list_copies(&self, book_id: &str) -> ClientResult<Vec<BookCopy>> {
        self.fetch(self.request(Method::GET, &format!("/books/{}/copies", book_id)))
            .await
    }

    pub async fn add_copy(&self, book_id: &str, copy: &CreateCopy) -> ClientResult<BookCopy> {
        self.fetch(
            self.request(Method::POST, &format!("/books/{}/copies", book_id))
                .json(copy),
        )
        .await
    }

    pub async fn update_copy(&self, id: &str, changes: &UpdateCopy) -> ClientResult<BookCopy> {
        self.fetch(
            self.request(Method::PUT, &format!("/book-copies/{}", id))
                .json(changes),
        )
        .await
    }

    pub async fn delete_copy(&self, id: &str) -> ClientResult<()> {
        self.execute(self.request(Method::DELETE, &format!("/book-copies/{}", id)))
            .await?;
        Ok(())
    }

    // Members

    pub async fn list_members(&self, query: &MemberQuery) -> ClientResult<Page<Member>> {
        self.fetch(self.request(Method::GET, "/members").query(query)).await
    }

    pub async fn get_member(&self, id: &str) -> ClientResult<Member> {
        self.fetch(self.request(Method::GET, &format!("/members/{}", id)))
            .await
    }

    pub async fn create_member(&self, member: &CreateMember) -> ClientResult<Member> {
        self.fetch(self.request(Method::POST, "/members").json(member)).await
    }

    pub async fn update_member(&self, id: &str, changes: &UpdateMember) -> ClientResult<Member> {
        self.fetch(self.request(Method::PUT, &format!("/members/{}", id)).json(changes))
            .await
    }

    pub async fn delete_member(&self, id: &str) -> ClientResult<()> {
        self.execute(self.request(Method::DELETE, &format!("/members/{}", id)))
            .await?;
        Ok(())
    }

    pub async fn member_loans(&self, member_id: &str, query: &LoanQuery) -> ClientResult<Page<Loan>> {
        self.fetch(
            self.request(Method::GET, &format!("/members/{}/loans", member_id))
                .query(query),
        )
        .await
    }

    pub async fn member_reservations(
        &self,
        member_id: &str,
        query: &ReservationQuery,
    ) -> ClientResult<Page<Reservation>> {
        self.fetch(
            self.request(Method::GET, &format!("/members/{}/reservations", member_id))
                .query(query),
        )
        .await
    }

    // Circulation

    pub async fn issue_book(&self, request: &IssueLoan) -> ClientResult<Loan> {
        self.fetch(self.request(Method::POST, "/loans/issue").json(request))
            .await
    }

    pub async fn return_book(&self, loan_id: &str) -> ClientResult<Loan> {
        let body = ReturnLoan {
            loan_id: Some(loan_id.to_string()),
        };
        self.fetch(self.request(Method::POST, "/loans/return").json(&body))
            .await
    }

    pub async fn list_loans(&self, query: &LoanQuery) -> ClientResult<Page<Loan>> {
        self.fetch(self.request(Method::GET, "/loans").query(query)).await
    }

    pub async fn overdue_loans(&self) -> ClientResult<Vec<Loan>> {
        self.fetch(self.request(Method::GET, "/loans/overdue")).await
    }

    pub async fn get_loan(&self, id: &str) -> ClientResult<Loan> {
        self.fetch(self.request(Method::GET, &format!("/loans/{}", id)))
            .await
    }

    pub async fn list_reservations(&self, query: &ReservationQuery) -> ClientResult<Page<Reservation>> {
        self.fetch(self.request(Method::GET, "/reservations").query(query))
            .await
    }

    pub async fn get_reservation(&self, id: &str) -> ClientResult<Reservation> {
        self.fetch(self.request(Method::GET, &format!("/reservations/{}", id)))
            .await
    }

    /// Reserve a title; `member_id` defaults server-side to the caller's own profile
    pub async fn reserve_book(&self, book_id: &str, member_id: Option<&str>) -> ClientResult<Reservation> {
        let body = CreateReservation {
            book_id: Some(book_id.to_string()),
            member_id: member_id.map(str::to_string),
        };
        self.fetch(self.request(Method::POST, "/reservations").json(&body))
            .await
    }

    pub async fn cancel_reservation(&self, id: &str) -> ClientResult<Reservation> {
        self.fetch(self.request(Method::DELETE, &format!("/reservations/{}", id)))
            .await
    }

    pub async fn fulfill_reservation(&self, id: &str) -> ClientResult<Loan> {
        self.fetch(self.request(Method::POST, &format!("/reservations/{}/fulfill", id)))
            .await
    }

    // Dashboard

    pub async fn dashboard_stats(&self) -> ClientResult<DashboardStats> {
        self.fetch(self.request(Method::GET, "/dashboard/stats")).await
    }

    pub async fn recent_activity(&self, limit: Option<usize>) -> ClientResult<Vec<Activity>> {
        let request = self.request(Method::GET, "/dashboard/activity");
        let request = match limit {
            Some(limit) => request.query(&[("limit", limit)]),
            None => request,
        };
        self.fetch(request).await
    }

    /// Liveness check; not wrapped in an envelope
    pub async fn health(&self) -> ClientResult<HealthResponse> {
        let response = self.request(Method::GET, "/health").send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Rejected {
                status: response.status().as_u16(),
                code: None,
                message: "Health check failed".to_string(),
            });
        }
        Ok(response.json().await?)
    }
}

/// Decode a response into its envelope, mapping failure envelopes to errors
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<Envelope<T>> {
    let status = response.status();

    if status.is_success() {
        let envelope: Envelope<T> = response.json().await?;
        if !envelope.success {
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                code: None,
                message: envelope
                    .message
                    .or(envelope.error)
                    .unwrap_or_else(|| "Request failed".to_string()),
            });
        }
        return Ok(envelope);
    }

    let (code, message) = match response.json::<FailureBody>().await {
        Ok(body) => (body.error, body.message),
        Err(e) => {
            tracing::debug!("Failure response without an envelope: {}", e);
            (None, None)
        }
    };
    let message = message.unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    });

    Err(ClientError::from_failure(status.as_u16(), code, message))
}

