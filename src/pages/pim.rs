use tracing::{error, info};

use crate::browser::{ElementActions, ElementState, Locator};
use crate::error::HarnessResult;

const ROW_COUNT_POLLS: u32 = 3;

/// Employee records (PIM module).
#[derive(Clone)]
pub struct PimPage {
    actions: ElementActions,
    header: Locator,
    employee_name_input: Locator,
    search_button: Locator,
    record_rows: Locator,
    list_table: Locator,
    delete_confirm_popup: Locator,
    delete_yes_button: Locator,
    first_name_input: Locator,
    last_name_input: Locator,
    save_button: Locator,
    loading_spinner: Locator,
}

fn table_body() -> Locator {
    Locator::css(".orangehrm-container").locator(Locator::css(".oxd-table-body"))
}

impl PimPage {
    pub fn new(actions: ElementActions) -> Self {
        Self {
            actions,
            header: Locator::role("heading", "PIM"),
            employee_name_input: Locator::xpath(
                "//div[@class = 'oxd-table-filter-area']/form/div[1]/div[1]/div[1]/div[1]/div[2]/div[1]/div[1]/input",
            ),
            search_button: Locator::role("button", "Search"),
            record_rows: table_body().locator(Locator::css(".oxd-table-card")),
            list_table: table_body(),
            delete_confirm_popup: Locator::text("Are you Sure?"),
            delete_yes_button: Locator::role("button", "Yes, Delete"),
            first_name_input: Locator::role("textbox", "First Name"),
            last_name_input: Locator::role("textbox", "Last Name"),
            save_button: Locator::role("button", "Save"),
            loading_spinner: Locator::css(".oxd-loading-spinner"),
        }
    }

    pub fn record_rows(&self) -> &Locator {
        &self.record_rows
    }

    pub fn delete_confirm_popup(&self) -> &Locator {
        &self.delete_confirm_popup
    }

    pub fn delete_yes_button(&self) -> &Locator {
        &self.delete_yes_button
    }

    pub fn sub_menu_link(&self, text: &str) -> Locator {
        Locator::role_exact("link", text)
    }

    /// Action button `position` (0-based) of table row `row` (0-based).
    pub fn row_action_button(&self, row: usize, position: usize) -> Locator {
        self.record_rows
            .clone()
            .nth(row)
            .locator(Locator::css(".oxd-table-cell-actions"))
            .locator(Locator::css("button"))
            .nth(position)
    }

    pub async fn expected_page_header(&self, expected: &str) -> bool {
        self.actions.get_text(&self.header, true).await == expected
    }

    /// Search the employee list; true when exactly one record matches.
    pub async fn search_employee_by_name(&self, first: &str, last: &str, sub_menu: &str) -> HarnessResult<bool> {
        let full_name = format!("{} {}", first, last);
        info!("Navigating to PIM Sub Menu: {}", sub_menu);
        self.actions.click(&self.sub_menu_link(sub_menu)).await?;
        self.actions.type_text(&self.employee_name_input, &full_name).await?;
        self.actions.click(&self.search_button).await?;

        info!("Searching for employee by name: {}", full_name);
        self.actions
            .expect_state(&self.list_table, ElementState::Attached, None)
            .await?;
        let rows = self.table_row_count().await;
        info!("Number of records found for employee '{}': {}", full_name, rows);

        if rows == 1 {
            info!("Employee '{}' found in the search results.", full_name);
            Ok(true)
        } else {
            info!("Employee '{}' NOT found in the search results.", full_name);
            Ok(false)
        }
    }

    pub async fn table_row_count(&self) -> usize {
        self.actions.count_with_retry(&self.record_rows, ROW_COUNT_POLLS).await
    }

    /// Click the row's delete action and confirm the popup.
    pub async fn delete_table_row(&self, row: usize, action_position: usize) -> HarnessResult<()> {
        info!("Initiating delete action for row {}.", row);

        let result = async {
            self.actions.click(&self.row_action_button(row, action_position)).await?;

            info!("Waiting for delete confirmation popup to be visible.");
            self.actions
                .expect_state(&self.delete_confirm_popup, ElementState::Visible, None)
                .await?;

            info!("Clicking on 'Yes, Delete' button to confirm deletion.");
            self.actions.click(&self.delete_yes_button).await?;

            self.actions.wait_for_network_idle().await?;
            info!("Waiting for delete confirmation popup to be hidden.");
            self.actions
                .expect_state(&self.delete_confirm_popup, ElementState::Hidden, None)
                .await
        }
        .await;

        match &result {
            Ok(()) => info!("Row deleted successfully."),
            Err(e) => error!("Error while deleting the row. Error: {}", e),
        }
        result
    }

    pub async fn create_new_user(&self, first: &str, last: &str, sub_menu: &str) -> HarnessResult<()> {
        info!("Navigating to PIM Sub Menu: {}", sub_menu);
        self.actions.click(&self.sub_menu_link(sub_menu)).await?;

        info!("Entering first and last name of the user.");
        self.actions.type_text(&self.first_name_input, first).await?;
        self.actions.type_text(&self.last_name_input, last).await?;

        info!("Clicking on Save button to create new user.");
        self.actions.click(&self.save_button).await?;

        // the spinner may already be gone; only wait for it to settle
        self.actions.is_visible(&self.loading_spinner, None).await;
        Ok(())
    }

    /// Delete a pre-existing record with this name so a test starts clean.
    pub async fn ensure_user_is_deleted(
        &self,
        first: &str,
        last: &str,
        sub_menu: &str,
        row: usize,
        action_position: usize,
    ) -> HarnessResult<()> {
        if self.search_employee_by_name(first, last, sub_menu).await? {
            info!("User '{} {}' already exists. Deleting the user for clean state.", first, last);
            self.delete_table_row(row, action_position).await
        } else {
            info!("User '{} {}' does not exist. Skipping the deletion.", first, last);
            Ok(())
        }
    }
}
