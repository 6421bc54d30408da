use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::domain::entities::product::{Product, ProductId};
use crate::domain::entities::table::{
    ColumnId, DerivedRows, FilterValue, SortDirection, SortSpec, TableError, TableState,
};

/// Raw product list plus the table view state. Every read re-derives the
/// visible rows from both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductTable {
    data: Vec<Product>,
    state: TableState,
}

impl ProductTable {
    pub fn new(page_size: usize) -> Self {
        Self {
            data: Vec::new(),
            state: TableState::with_page_size(page_size),
        }
    }

    pub fn data(&self) -> &[Product] {
        &self.data
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    /// Installs a freshly fetched data set. The selection refers to the old
    /// set, so it is dropped.
    pub fn replace_data(&mut self, data: Vec<Product>) {
        self.data = data;
        self.state.selection.clear();
        self.clamp_page();
    }

    pub fn derive(&self) -> DerivedRows {
        derive_rows(&self.data, &self.state)
    }

    pub fn sort_direction(&self, column: ColumnId) -> Option<SortDirection> {
        self.state
            .sorting
            .iter()
            .find(|spec| spec.column == column)
            .map(|spec| spec.direction)
    }

    pub fn set_sort(
        &mut self,
        column: ColumnId,
        direction: Option<SortDirection>,
    ) -> Result<(), TableError> {
        if !column.sortable() {
            return Err(TableError::NotSortable(column));
        }
        let position = self
            .state
            .sorting
            .iter()
            .position(|spec| spec.column == column);
        match (position, direction) {
            (Some(idx), Some(direction)) => self.state.sorting[idx].direction = direction,
            (Some(idx), None) => {
                self.state.sorting.remove(idx);
            }
            (None, Some(direction)) => self.state.sorting.push(SortSpec { column, direction }),
            (None, None) => {}
        }
        Ok(())
    }

    /// Header click: none -> asc -> desc -> none. Without `multi` the column
    /// becomes the only sort key.
    pub fn toggle_sort(&mut self, column: ColumnId, multi: bool) -> Result<(), TableError> {
        let next = match self.sort_direction(column) {
            None => Some(SortDirection::Asc),
            Some(SortDirection::Asc) => Some(SortDirection::Desc),
            Some(SortDirection::Desc) => None,
        };
        if !multi {
            if !column.sortable() {
                return Err(TableError::NotSortable(column));
            }
            self.state.sorting.retain(|spec| spec.column == column);
        }
        self.set_sort(column, next)
    }

    pub fn filter(&self, column: ColumnId) -> Option<&FilterValue> {
        self.state.filters.get(&column)
    }

    pub fn set_filter(
        &mut self,
        column: ColumnId,
        value: Option<FilterValue>,
    ) -> Result<(), TableError> {
        let expected = column
            .filter_kind()
            .ok_or(TableError::NotFilterable(column))?;
        match value {
            Some(value) if value.kind() != expected => {
                return Err(TableError::FilterKindMismatch {
                    column,
                    expected,
                    actual: value.kind(),
                });
            }
            Some(value) if !value.is_noop() => {
                self.state.filters.insert(column, value);
            }
            _ => {
                self.state.filters.remove(&column);
            }
        }
        self.state.page = 0;
        self.prune_selection();
        Ok(())
    }

    pub fn clear_filters(&mut self) {
        self.state.filters.clear();
        self.state.page = 0;
    }

    pub fn is_column_visible(&self, column: ColumnId) -> bool {
        self.state.visibility.get(&column).copied().unwrap_or(true)
    }

    pub fn set_column_visible(&mut self, column: ColumnId, visible: bool) -> Result<(), TableError> {
        if !column.hideable() {
            return Err(TableError::NotHideable(column));
        }
        self.state.visibility.insert(column, visible);
        Ok(())
    }

    pub fn visible_columns(&self) -> Vec<ColumnId> {
        ColumnId::ALL
            .into_iter()
            .filter(|column| self.is_column_visible(*column))
            .collect()
    }

    pub fn is_selected(&self, id: ProductId) -> bool {
        self.state.selection.contains(&id)
    }

    pub fn set_selected(&mut self, id: ProductId, selected: bool) {
        if selected {
            self.state.selection.insert(id);
        } else {
            self.state.selection.remove(&id);
        }
    }

    /// Applies to the rows of the current page only.
    pub fn set_all_selected(&mut self, selected: bool) {
        let page_ids = self.derive().row_ids();
        for id in page_ids {
            self.set_selected(id, selected);
        }
    }

    pub fn all_page_rows_selected(&self) -> bool {
        let page_ids = self.derive().row_ids();
        !page_ids.is_empty() && page_ids.iter().all(|id| self.is_selected(*id))
    }

    pub fn selected_products(&self) -> Vec<Product> {
        self.data
            .iter()
            .filter(|product| self.state.selection.contains(&product.id))
            .cloned()
            .collect()
    }

    pub fn set_page(&mut self, page: usize) {
        self.state.page = page;
        self.clamp_page();
    }

    pub fn can_previous_page(&self) -> bool {
        self.state.page > 0
    }

    pub fn can_next_page(&self) -> bool {
        self.state.page + 1 < page_count(self.filtered_ids().len(), self.state.page_size)
    }

    pub fn previous_page(&mut self) {
        if self.can_previous_page() {
            self.state.page -= 1;
        }
    }

    pub fn next_page(&mut self) {
        if self.can_next_page() {
            self.state.page += 1;
        }
    }

    fn filtered_ids(&self) -> BTreeSet<ProductId> {
        self.data
            .iter()
            .filter(|product| passes_filters(product, &self.state))
            .map(|product| product.id)
            .collect()
    }

    fn prune_selection(&mut self) {
        let visible = self.filtered_ids();
        self.state.selection.retain(|id| visible.contains(id));
    }

    fn clamp_page(&mut self) {
        let pages = page_count(self.filtered_ids().len(), self.state.page_size);
        self.state.page = self.state.page.min(pages - 1);
    }
}

/// Filter (AND of every active filter), stable sort, then paginate.
pub fn derive_rows(raw: &[Product], state: &TableState) -> DerivedRows {
    let mut filtered: Vec<&Product> = raw
        .iter()
        .filter(|product| passes_filters(product, state))
        .collect();

    if !state.sorting.is_empty() {
        filtered.sort_by(|left, right| compare_by_specs(left, right, &state.sorting));
    }

    let filtered_count = filtered.len();
    let selected_count = filtered
        .iter()
        .filter(|product| state.selection.contains(&product.id))
        .count();
    let page_size = state.page_size.max(1);
    let page_count = page_count(filtered_count, page_size);
    let page = state.page.min(page_count - 1);

    let rows = filtered
        .into_iter()
        .skip(page * page_size)
        .take(page_size)
        .cloned()
        .collect();

    DerivedRows {
        rows,
        filtered_count,
        selected_count,
        page,
        page_count,
    }
}

fn page_count(filtered_count: usize, page_size: usize) -> usize {
    filtered_count.div_ceil(page_size.max(1)).max(1)
}

fn passes_filters(product: &Product, state: &TableState) -> bool {
    state
        .filters
        .iter()
        .all(|(column, value)| matches_filter(product, *column, value))
}

fn matches_filter(product: &Product, column: ColumnId, value: &FilterValue) -> bool {
    if value.is_noop() {
        return true;
    }
    match (column, value) {
        (ColumnId::Title, FilterValue::Text(term)) => product
            .title
            .to_lowercase()
            .contains(&term.trim().to_lowercase()),
        (ColumnId::Category, FilterValue::Select(selected)) => product
            .category
            .as_str()
            .eq_ignore_ascii_case(selected.trim()),
        (ColumnId::Price, FilterValue::Range { min, max }) => {
            min.is_none_or(|min| product.price >= min) && max.is_none_or(|max| product.price <= max)
        }
        _ => true,
    }
}

fn compare_by_specs(left: &Product, right: &Product, specs: &[SortSpec]) -> Ordering {
    for spec in specs {
        let ordering = compare_column(left, right, spec.column);
        let ordering = match spec.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn compare_column(left: &Product, right: &Product, column: ColumnId) -> Ordering {
    match column {
        ColumnId::Title => left.title.to_lowercase().cmp(&right.title.to_lowercase()),
        ColumnId::Price => left.price.total_cmp(&right.price),
        ColumnId::Category => left.category.as_str().cmp(right.category.as_str()),
        ColumnId::Image => left.image.cmp(&right.image),
        ColumnId::Select | ColumnId::Actions => Ordering::Equal,
    }
}
