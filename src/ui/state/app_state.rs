use std::sync::Arc;

use dioxus::prelude::{use_signal, Signal};

use crate::config::AppConfig;
use crate::domain::entities::product::{FieldErrors, LoginField, Product, ProductId};
use crate::domain::table_engine::ProductTable;
use crate::usecase::services::auth_service::AuthService;
use crate::usecase::services::product_service::ProductService;
use crate::usecase::workflow::{DeleteConfirmation, ProductEditor};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Login,
    Products,
    Details(ProductId),
    Create,
    Edit(ProductId),
}

/// Long-lived services shared by every screen.
#[derive(Clone)]
pub struct Services {
    pub products: Arc<ProductService>,
    pub auth: Arc<AuthService>,
    pub config: AppConfig,
}

#[derive(Clone)]
pub enum Startup {
    Ready(Services),
    Failed(String),
}

#[derive(Clone, Copy)]
pub struct AppState {
    pub screen: Signal<Screen>,
    pub table: Signal<ProductTable>,
    pub delete: Signal<DeleteConfirmation>,
    pub editor: Signal<ProductEditor>,
    pub detail: Signal<Option<Product>>,
    pub image_name: Signal<Option<String>>,
    pub username: Signal<String>,
    pub password: Signal<String>,
    pub login_errors: Signal<FieldErrors<LoginField>>,
    pub busy: Signal<bool>,
    pub status: Signal<String>,
    /// Bumped after a mutation so mounted views refetch.
    pub revision: Signal<u64>,
}

impl AppState {
    pub fn new(page_size: usize) -> Self {
        Self {
            screen: use_signal(|| Screen::Login),
            table: use_signal(|| ProductTable::new(page_size)),
            delete: use_signal(DeleteConfirmation::new),
            editor: use_signal(ProductEditor::create),
            detail: use_signal(|| None::<Product>),
            image_name: use_signal(|| None::<String>),
            username: use_signal(String::new),
            password: use_signal(String::new),
            login_errors: use_signal(FieldErrors::<LoginField>::new),
            busy: use_signal(|| false),
            status: use_signal(|| "Ready".to_string()),
            revision: use_signal(|| 0_u64),
        }
    }
}
