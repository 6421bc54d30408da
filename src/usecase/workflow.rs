use crate::domain::entities::product::{
    Product, ProductField, ProductFieldErrors, ProductForm, ProductId,
};
use crate::usecase::ports::catalog_api::ApiError;
use crate::usecase::services::product_service::{MutationOutcome, ProductService, SubmitRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit(ProductId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationStatus {
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MutationError {
    #[error("{0}")]
    Validation(ProductFieldErrors),
    #[error("a submission is already in progress")]
    Busy,
    #[error(transparent)]
    Network(#[from] ApiError),
}

/// Create/edit form state: `Idle -> Validating -> Submitting -> Succeeded | Failed`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductEditor {
    mode: EditorMode,
    form: ProductForm,
    errors: ProductFieldErrors,
    status: MutationStatus,
}

impl ProductEditor {
    pub fn create() -> Self {
        Self {
            mode: EditorMode::Create,
            form: ProductForm::default(),
            errors: ProductFieldErrors::new(),
            status: MutationStatus::Idle,
        }
    }

    /// Edit mode waiting for the product to load.
    pub fn edit(id: ProductId) -> Self {
        Self {
            mode: EditorMode::Edit(id),
            ..Self::create()
        }
    }

    pub fn for_product(product: &Product) -> Self {
        let mut editor = Self::edit(product.id);
        editor.load(product);
        editor
    }

    /// Pre-fills the form from the edit target.
    pub fn load(&mut self, product: &Product) {
        self.form = ProductForm::from_product(product);
        self.errors = ProductFieldErrors::new();
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn form(&self) -> &ProductForm {
        &self.form
    }

    pub fn status(&self) -> &MutationStatus {
        &self.status
    }

    pub fn error(&self, field: ProductField) -> Option<&str> {
        self.errors.get(field)
    }

    pub fn is_submitting(&self) -> bool {
        self.status == MutationStatus::Submitting
    }

    pub fn set_field(&mut self, field: ProductField, value: String) {
        self.form.set(field, value);
        self.errors.remove(field);
    }

    /// Validates the form. On success the editor is `Submitting` and the
    /// returned request must be handed to the service, then to `finish`.
    pub fn begin_submit(&mut self) -> Result<SubmitRequest, MutationError> {
        if self.is_submitting() {
            return Err(MutationError::Busy);
        }
        self.status = MutationStatus::Validating;
        match self.form.validate() {
            Ok(draft) => {
                self.errors = ProductFieldErrors::new();
                self.status = MutationStatus::Submitting;
                Ok(match self.mode {
                    EditorMode::Create => SubmitRequest::Create(draft),
                    EditorMode::Edit(id) => SubmitRequest::Update(id, draft),
                })
            }
            Err(errors) => {
                self.errors = errors.clone();
                self.status = MutationStatus::Idle;
                Err(MutationError::Validation(errors))
            }
        }
    }

    /// Records the server's answer. Form input is kept either way.
    pub fn finish(&mut self, result: &Result<MutationOutcome, ApiError>) {
        self.status = match result {
            Ok(_) => MutationStatus::Succeeded,
            Err(err) => MutationStatus::Failed(err.to_string()),
        };
    }

    pub fn submit(&mut self, service: &ProductService) -> Result<MutationOutcome, MutationError> {
        let request = self.begin_submit()?;
        let result = service.submit(&request);
        self.finish(&result);
        result.map_err(MutationError::from)
    }
}

/// Two-step delete. At most one target is pending confirmation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteConfirmation {
    pending: Option<Product>,
    in_flight: Option<ProductId>,
}

impl DeleteConfirmation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Holds `product` for confirmation, replacing any earlier target.
    pub fn request_delete(&mut self, product: Product) {
        self.pending = Some(product);
    }

    pub fn pending(&self) -> Option<&Product> {
        self.pending.as_ref()
    }

    pub fn cancel_delete(&mut self) -> Option<Product> {
        self.pending.take()
    }

    /// Releases the held target for submission.
    pub fn confirm_delete(&mut self) -> Option<Product> {
        let target = self.pending.take()?;
        self.in_flight = Some(target.id);
        Some(target)
    }

    pub fn is_deleting(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn finish(&mut self) {
        self.in_flight = None;
    }

    pub fn confirm_and_submit(
        &mut self,
        service: &ProductService,
    ) -> Option<Result<MutationOutcome, ApiError>> {
        let target = self.confirm_delete()?;
        let result = service.delete_product(target.id);
        self.finish();
        Some(result)
    }
}
