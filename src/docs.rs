use crate::api::deduction::{CreateDeduction, DeductionFilter};
use crate::api::employee::{CreateEmployee, EmployeeListResponse, EmployeeQuery};
use crate::api::payroll::{
    PaginatedPayrollResponse, PayrollQuery, RecalculateAll, RecalculatePayroll,
    UpdatePaymentStatus,
};
use crate::api::timesheet::{EditTimesheet, SaveTimesheet, ShiftPreview, TimesheetFilter};
use crate::engine::{NightStatus, ShiftHours};
use crate::model::deduction::{Deduction, DeductionCategory, DeductionStatus};
use crate::model::employee::Employee;
use crate::model::payroll::{DeductionTotals, PayBasis, PayPeriod, PaymentStatus, PayrollEntry};
use crate::model::timesheet::{EntryStatus, TimesheetEntry};
use crate::service::{BulkRecalculation, RecalculationFailure};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shiftpay API",
        version = "0.1.0",
        description = r#"
## Shift payroll

Turns clock-in/clock-out records into payroll for shift-working staff.

### Key Features
- **Employees**: pay configuration and standard shift
- **Timesheets**: record, edit and void shifts, or preview the hour split of a shift
- **Deductions**: advances, loan repayments and other deductions per pay period
- **Payroll**: recalculate one employee or everyone for a period, and mark entries paid

Recalculating an entry that was already paid keeps it paid and flags the
difference against the paid amount as an adjustment.
"#,
    ),
    paths(
        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,

        crate::api::timesheet::save_timesheet,
        crate::api::timesheet::edit_timesheet,
        crate::api::timesheet::void_timesheet,
        crate::api::timesheet::list_timesheets,
        crate::api::timesheet::preview_shift,

        crate::api::deduction::create_deduction,
        crate::api::deduction::list_deductions,
        crate::api::deduction::delete_deduction,

        crate::api::payroll::recalculate_payroll,
        crate::api::payroll::recalculate_all,
        crate::api::payroll::get_payroll,
        crate::api::payroll::list_payrolls,
        crate::api::payroll::update_payment_status
    ),
    components(
        schemas(
            Employee,
            CreateEmployee,
            EmployeeQuery,
            EmployeeListResponse,
            TimesheetEntry,
            EntryStatus,
            SaveTimesheet,
            EditTimesheet,
            TimesheetFilter,
            ShiftPreview,
            ShiftHours,
            NightStatus,
            Deduction,
            DeductionCategory,
            DeductionStatus,
            CreateDeduction,
            DeductionFilter,
            PayrollEntry,
            PayBasis,
            PaymentStatus,
            PayPeriod,
            DeductionTotals,
            RecalculatePayroll,
            RecalculateAll,
            UpdatePaymentStatus,
            PayrollQuery,
            PaginatedPayrollResponse,
            BulkRecalculation,
            RecalculationFailure
        )
    ),
    tags(
        (name = "Employee", description = "Employee pay configuration"),
        (name = "Timesheet", description = "Shift records and hour previews"),
        (name = "Deduction", description = "Advances, loans and other deductions"),
        (name = "Payroll", description = "Payroll recalculation and payment status"),
    )
)]
pub struct ApiDoc;
