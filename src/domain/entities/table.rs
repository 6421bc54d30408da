use std::collections::{BTreeMap, BTreeSet};

use crate::domain::entities::product::{Product, ProductId};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Select filter value that disables the category filter.
pub const ALL_OPTION_VALUE: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColumnId {
    Select,
    Image,
    Title,
    Category,
    Price,
    Actions,
}

impl ColumnId {
    /// Display order.
    pub const ALL: [ColumnId; 6] = [
        ColumnId::Select,
        ColumnId::Image,
        ColumnId::Title,
        ColumnId::Category,
        ColumnId::Price,
        ColumnId::Actions,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ColumnId::Select => "select",
            ColumnId::Image => "image",
            ColumnId::Title => "title",
            ColumnId::Category => "category",
            ColumnId::Price => "price",
            ColumnId::Actions => "actions",
        }
    }

    pub fn header(self) -> &'static str {
        match self {
            ColumnId::Select | ColumnId::Actions => "",
            ColumnId::Image => "Image",
            ColumnId::Title => "Title",
            ColumnId::Category => "Category",
            ColumnId::Price => "Price",
        }
    }

    pub fn filter_kind(self) -> Option<FilterKind> {
        match self {
            ColumnId::Title => Some(FilterKind::Text),
            ColumnId::Category => Some(FilterKind::Select),
            ColumnId::Price => Some(FilterKind::Range),
            ColumnId::Select | ColumnId::Image | ColumnId::Actions => None,
        }
    }

    pub fn sortable(self) -> bool {
        matches!(self, ColumnId::Image | ColumnId::Title | ColumnId::Price)
    }

    pub fn hideable(self) -> bool {
        !matches!(self, ColumnId::Select | ColumnId::Actions)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Text,
    Select,
    Range,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Select(String),
    Range { min: Option<f64>, max: Option<f64> },
}

impl FilterValue {
    pub fn kind(&self) -> FilterKind {
        match self {
            FilterValue::Text(_) => FilterKind::Text,
            FilterValue::Select(_) => FilterKind::Select,
            FilterValue::Range { .. } => FilterKind::Range,
        }
    }

    /// Values that would match every row.
    pub fn is_noop(&self) -> bool {
        match self {
            FilterValue::Text(term) => term.trim().is_empty(),
            FilterValue::Select(value) => {
                let value = value.trim();
                value.is_empty() || value.eq_ignore_ascii_case(ALL_OPTION_VALUE)
            }
            FilterValue::Range { min, max } => min.is_none() && max.is_none(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn indicator(direction: Option<SortDirection>) -> &'static str {
        match direction {
            Some(SortDirection::Asc) => "▲",
            Some(SortDirection::Desc) => "▼",
            None => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub column: ColumnId,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TableError {
    #[error("column {0:?} cannot be filtered")]
    NotFilterable(ColumnId),
    #[error("column {column:?} expects a {expected:?} filter, got {actual:?}")]
    FilterKindMismatch {
        column: ColumnId,
        expected: FilterKind,
        actual: FilterKind,
    },
    #[error("column {0:?} cannot be sorted")]
    NotSortable(ColumnId),
    #[error("column {0:?} cannot be hidden")]
    NotHideable(ColumnId),
}

/// View state of the product table. Created empty on mount, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct TableState {
    pub sorting: Vec<SortSpec>,
    pub filters: BTreeMap<ColumnId, FilterValue>,
    pub visibility: BTreeMap<ColumnId, bool>,
    pub selection: BTreeSet<ProductId>,
    pub page: usize,
    pub page_size: usize,
}

impl Default for TableState {
    fn default() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }
}

impl TableState {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            sorting: Vec::new(),
            filters: BTreeMap::new(),
            visibility: BTreeMap::new(),
            selection: BTreeSet::new(),
            page: 0,
            page_size: page_size.max(1),
        }
    }
}

/// Filtered, sorted and paginated view of the raw product list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DerivedRows {
    pub rows: Vec<Product>,
    pub filtered_count: usize,
    pub selected_count: usize,
    pub page: usize,
    pub page_count: usize,
}

impl DerivedRows {
    pub fn row_ids(&self) -> Vec<ProductId> {
        self.rows.iter().map(|product| product.id).collect()
    }
}
