use crate::db::InvoiceStore;
use crate::error::ActionError;
use crate::models::form::{FIELD_AMOUNT, MSG_AMOUNT_GT_ZERO};
use crate::models::{
    ActionOutcome, ActionState, FieldErrors, InvoiceChanges, InvoiceForm, InvoiceInput, NewInvoice,
};
use crate::service::revalidate::Revalidator;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;

/// 发票列表页路径 (缓存失效 + 跳转目标)
pub const INVOICES_PATH: &str = "/dashboard/invoices";

pub const MSG_CREATE_MISSING_FIELDS: &str = "Missing fields. Failed to create invoice.";
pub const MSG_CREATE_DB_ERROR: &str = "Database error: failed to create invoice.";
pub const MSG_UPDATE_DB_ERROR: &str = "Database error: failed to update invoice.";
pub const MSG_DELETE_DB_ERROR: &str = "Database error: could not delete invoice.";

fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

/// 发票表单 Action: 校验 -> 单条写入 -> 缓存失效 -> 跳转
///
/// 每次调用无状态, 除存储外不在调用之间保留任何数据
pub struct InvoiceActions {
    store: Arc<dyn InvoiceStore>,
    revalidator: Arc<dyn Revalidator>,
    today: fn() -> NaiveDate,
}

impl InvoiceActions {
    pub fn new(store: Arc<dyn InvoiceStore>, revalidator: Arc<dyn Revalidator>) -> Self {
        Self {
            store,
            revalidator,
            today: utc_today,
        }
    }

    /// 替换日期来源 (测试用固定日期)
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// 创建发票
    ///
    /// 校验失败返回字段错误; 写库失败返回汇总信息且不失效缓存; 成功则失效并跳转
    pub async fn create_invoice(&self, _prev_state: &ActionState, form: &InvoiceForm) -> ActionOutcome {
        let input = match form.safe_parse() {
            Ok(input) => input,
            Err(errors) => {
                return ActionOutcome::State(ActionState::invalid(errors, MSG_CREATE_MISSING_FIELDS));
            }
        };
        let amount_cents = match amount_in_cents(&input) {
            Ok(cents) => cents,
            Err(errors) => {
                return ActionOutcome::State(ActionState::invalid(errors, MSG_CREATE_MISSING_FIELDS));
            }
        };

        let invoice = NewInvoice {
            customer_id: input.customer_id,
            amount_cents,
            status: input.status,
            date: (self.today)(),
        };

        if let Err(e) = self.store.insert(&invoice).await {
            tracing::error!(error = %e, customer_id = %invoice.customer_id, "failed to create invoice");
            return ActionOutcome::State(ActionState::message(MSG_CREATE_DB_ERROR));
        }

        tracing::info!(
            customer_id = %invoice.customer_id,
            amount = invoice.amount_cents,
            status = %invoice.status,
            date = %invoice.date,
            "invoice created"
        );
        self.revalidator.revalidate_path(INVOICES_PATH);
        ActionOutcome::Redirect(INVOICES_PATH)
    }

    /// 更新发票 (date 不变)
    ///
    /// 校验失败以 `ActionError::Validation` 向上传播, 由 HTTP 错误边界统一转为字段错误
    pub async fn update_invoice(&self, id: &str, form: &InvoiceForm) -> Result<ActionOutcome, ActionError> {
        let input = form.parse()?;
        let amount_cents = amount_in_cents(&input).map_err(ActionError::Validation)?;

        let changes = InvoiceChanges {
            customer_id: input.customer_id,
            amount_cents,
            status: input.status,
        };

        match self.store.update(id, &changes).await {
            Ok(0) => tracing::warn!(invoice_id = id, "update matched no invoice"),
            Ok(_) => tracing::info!(invoice_id = id, amount = changes.amount_cents, "invoice updated"),
            Err(e) => {
                tracing::error!(error = %e, invoice_id = id, "failed to update invoice");
                return Ok(ActionOutcome::State(ActionState::message(MSG_UPDATE_DB_ERROR)));
            }
        }

        self.revalidator.revalidate_path(INVOICES_PATH);
        Ok(ActionOutcome::Redirect(INVOICES_PATH))
    }

    /// 删除发票, 成功后只失效缓存不跳转 (从列表页内调用)
    pub async fn delete_invoice(&self, id: &str) -> ActionOutcome {
        match self.store.delete(id).await {
            Ok(0) => tracing::warn!(invoice_id = id, "delete matched no invoice"),
            Ok(_) => tracing::info!(invoice_id = id, "invoice deleted"),
            Err(e) => {
                tracing::error!(error = %e, invoice_id = id, "failed to delete invoice");
                return ActionOutcome::State(ActionState::message(MSG_DELETE_DB_ERROR));
            }
        }

        self.revalidator.revalidate_path(INVOICES_PATH);
        ActionOutcome::Done
    }
}

fn amount_in_cents(input: &InvoiceInput) -> Result<i64, FieldErrors> {
    input.amount_in_cents().ok_or_else(|| {
        let mut errors = FieldErrors::new();
        errors.push(FIELD_AMOUNT, MSG_AMOUNT_GT_ZERO);
        errors
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::mock::{MockInvoiceStore, StoreCall};
    use crate::models::form::{FIELD_CUSTOMER_ID, FIELD_STATUS};
    use crate::models::{InvoiceRecord, InvoiceStatus};
    use crate::service::revalidate::mock::RecordingRevalidator;

    fn fixed_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    fn setup(store: MockInvoiceStore) -> (InvoiceActions, Arc<MockInvoiceStore>, Arc<RecordingRevalidator>) {
        let store = Arc::new(store);
        let revalidator = Arc::new(RecordingRevalidator::default());
        let actions = InvoiceActions::new(store.clone(), revalidator.clone()).with_clock(fixed_day);
        (actions, store, revalidator)
    }

    fn form(customer_id: Option<&str>, amount: Option<&str>, status: Option<&str>) -> InvoiceForm {
        InvoiceForm {
            customer_id: customer_id.map(String::from),
            amount: amount.map(String::from),
            status: status.map(String::from),
        }
    }

    fn existing(id: &str) -> InvoiceRecord {
        InvoiceRecord {
            id: id.to_string(),
            customer_id: "c0".to_string(),
            amount: 999,
            status: InvoiceStatus::Paid,
            date: NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_create_valid_invoice_writes_invalidates_and_redirects() {
        let (actions, store, revalidator) = setup(MockInvoiceStore::default());

        let outcome = actions
            .create_invoice(&ActionState::default(), &form(Some("c1"), Some("12.5"), Some("pending")))
            .await;

        assert_eq!(outcome, ActionOutcome::Redirect(INVOICES_PATH));
        assert_eq!(
            store.calls(),
            vec![StoreCall::Insert(NewInvoice {
                customer_id: "c1".to_string(),
                amount_cents: 1250,
                status: InvoiceStatus::Pending,
                date: fixed_day(),
            })]
        );
        assert_eq!(revalidator.paths(), vec![INVOICES_PATH.to_string()]);
    }

    #[tokio::test]
    async fn test_create_uses_utc_today_by_default() {
        let store = Arc::new(MockInvoiceStore::default());
        let actions = InvoiceActions::new(store.clone(), Arc::new(RecordingRevalidator::default()));

        actions
            .create_invoice(&ActionState::default(), &form(Some("c1"), Some("1"), Some("paid")))
            .await;

        match store.calls().as_slice() {
            [StoreCall::Insert(invoice)] => {
                let today = Utc::now().date_naive();
                assert!(invoice.date == today || invoice.date == today.pred_opt().unwrap());
                assert_eq!(invoice.date.format("%Y-%m-%d").to_string().len(), 10);
            }
            calls => panic!("unexpected calls: {:?}", calls),
        }
    }

    #[tokio::test]
    async fn test_create_invalid_input_returns_field_errors_without_writing() {
        let cases = vec![
            (form(None, Some("10"), Some("paid")), vec![FIELD_CUSTOMER_ID]),
            (form(Some("c1"), None, Some("paid")), vec![FIELD_AMOUNT]),
            (form(Some("c1"), Some("0"), Some("paid")), vec![FIELD_AMOUNT]),
            (form(Some("c1"), Some("-1"), Some("paid")), vec![FIELD_AMOUNT]),
            (form(Some("c1"), Some("10"), None), vec![FIELD_STATUS]),
            (form(Some("c1"), Some("10"), Some("void")), vec![FIELD_STATUS]),
            (form(None, None, None), vec![FIELD_CUSTOMER_ID, FIELD_AMOUNT, FIELD_STATUS]),
        ];

        for (input, expected_fields) in cases {
            let (actions, store, revalidator) = setup(MockInvoiceStore::default());
            let outcome = actions.create_invoice(&ActionState::default(), &input).await;

            let ActionOutcome::State(state) = outcome else {
                panic!("expected state for {:?}", input);
            };
            let fields: Vec<&str> = state.errors.as_ref().unwrap().fields().collect();
            assert_eq!(fields, expected_fields);
            assert_eq!(state.message.as_deref(), Some(MSG_CREATE_MISSING_FIELDS));
            assert!(store.calls().is_empty());
            assert!(revalidator.paths().is_empty());
        }
    }

    #[tokio::test]
    async fn test_create_store_failure_returns_message_only() {
        let (actions, store, revalidator) = setup(MockInvoiceStore::failing());

        let outcome = actions
            .create_invoice(&ActionState::default(), &form(Some("c1"), Some("12.5"), Some("pending")))
            .await;

        assert_eq!(outcome, ActionOutcome::State(ActionState::message(MSG_CREATE_DB_ERROR)));
        assert_eq!(store.calls().len(), 1);
        assert!(revalidator.paths().is_empty());
    }

    #[tokio::test]
    async fn test_update_issues_single_statement_and_keeps_date() {
        let (actions, store, revalidator) = setup(MockInvoiceStore::with_rows(vec![existing("inv-1")]));

        let outcome = actions
            .update_invoice("inv-1", &form(Some("c1"), Some("12.5"), Some("pending")))
            .await
            .unwrap();

        assert_eq!(outcome, ActionOutcome::Redirect(INVOICES_PATH));
        assert_eq!(
            store.calls(),
            vec![StoreCall::Update(
                "inv-1".to_string(),
                InvoiceChanges {
                    customer_id: "c1".to_string(),
                    amount_cents: 1250,
                    status: InvoiceStatus::Pending,
                }
            )]
        );
        let row = store.row("inv-1").unwrap();
        assert_eq!(row.date, existing("inv-1").date);
        assert_eq!(row.amount, 1250);
        assert_eq!(revalidator.paths(), vec![INVOICES_PATH.to_string()]);
    }

    #[tokio::test]
    async fn test_update_is_idempotent() {
        let (actions, store, _) = setup(MockInvoiceStore::with_rows(vec![existing("inv-1")]));
        let input = form(Some("c2"), Some("40"), Some("paid"));

        actions.update_invoice("inv-1", &input).await.unwrap();
        let first = store.row("inv-1").unwrap();
        actions.update_invoice("inv-1", &input).await.unwrap();
        let second = store.row("inv-1").unwrap();

        assert_eq!(first, second);
        assert_eq!(second.amount, 4000);
    }

    #[tokio::test]
    async fn test_update_invalid_input_propagates_validation_error() {
        let (actions, store, revalidator) = setup(MockInvoiceStore::default());

        let result = actions.update_invoice("inv-1", &form(Some("c1"), Some("0"), Some("paid"))).await;

        match result {
            Err(ActionError::Validation(errors)) => {
                assert_eq!(errors.fields().collect::<Vec<_>>(), vec![FIELD_AMOUNT]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(store.calls().is_empty());
        assert!(revalidator.paths().is_empty());
    }

    #[tokio::test]
    async fn test_update_store_failure_returns_message() {
        let (actions, _, revalidator) = setup(MockInvoiceStore::failing());

        let outcome = actions
            .update_invoice("inv-1", &form(Some("c1"), Some("1"), Some("paid")))
            .await
            .unwrap();

        assert_eq!(outcome, ActionOutcome::State(ActionState::message(MSG_UPDATE_DB_ERROR)));
        assert!(revalidator.paths().is_empty());
    }

    #[tokio::test]
    async fn test_delete_invalidates_without_redirect() {
        let (actions, store, revalidator) = setup(MockInvoiceStore::with_rows(vec![existing("inv-1")]));

        let outcome = actions.delete_invoice("inv-1").await;

        assert_eq!(outcome, ActionOutcome::Done);
        assert_eq!(store.calls(), vec![StoreCall::Delete("inv-1".to_string())]);
        assert!(store.row("inv-1").is_none());
        assert_eq!(revalidator.paths(), vec![INVOICES_PATH.to_string()]);
    }

    #[tokio::test]
    async fn test_delete_store_failure_returns_message() {
        let (actions, _, revalidator) = setup(MockInvoiceStore::failing());

        let outcome = actions.delete_invoice("inv-1").await;

        assert_eq!(outcome, ActionOutcome::State(ActionState::message(MSG_DELETE_DB_ERROR)));
        assert!(revalidator.paths().is_empty());
    }
}
