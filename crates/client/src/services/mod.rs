//! REST bindings for the portal pages.
//!
//! Each binding borrows the [`ApiClient`] so every call goes through the
//! auth interceptor. Payloads are passed through as JSON; the API owns their
//! shape.

mod accounts;
mod assignments;
mod courses;
mod grades;
mod instructor;
mod modules;
mod quizzes;
mod student;
mod wallet;

pub use accounts::{AccountsApi, LOGIN_PATH, LoginResponse};
pub use assignments::AssignmentsApi;
pub use courses::CoursesApi;
pub use grades::GradesApi;
pub use instructor::InstructorApi;
pub use modules::ModulesApi;
pub use quizzes::QuizzesApi;
pub use student::StudentApi;
pub use wallet::{TransactionKind, WalletApi};

use crate::http::ApiClient;

impl ApiClient {
    pub fn accounts(&self) -> AccountsApi<'_> {
        AccountsApi::new(self)
    }

    pub fn modules(&self) -> ModulesApi<'_> {
        ModulesApi::new(self)
    }

    pub fn quizzes(&self) -> QuizzesApi<'_> {
        QuizzesApi::new(self)
    }

    pub fn courses(&self) -> CoursesApi<'_> {
        CoursesApi::new(self)
    }

    pub fn assignments(&self) -> AssignmentsApi<'_> {
        AssignmentsApi::new(self)
    }

    pub fn grades(&self) -> GradesApi<'_> {
        GradesApi::new(self)
    }

    pub fn instructor(&self) -> InstructorApi<'_> {
        InstructorApi::new(self)
    }

    pub fn student(&self) -> StudentApi<'_> {
        StudentApi::new(self)
    }

    pub fn wallet(&self) -> WalletApi<'_> {
        WalletApi::new(self)
    }
}
