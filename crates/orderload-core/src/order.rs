//! Order record and line parser
//!
//! Input lines are comma-delimited with no header and no quoting. Every field
//! is carried as the raw text token from the file: the loader is a pass-through
//! and leaves type conversion to the storage backend.

use crate::error::IngestError;

/// Number of fields in one order line
pub const FIELD_COUNT: usize = 14;

/// Field delimiter of order files
pub const DELIMITER: char = ',';

/// Storage column names, in the positional order of an order line.
pub const COLUMNS: [&str; FIELD_COUNT] = [
    "OrderId",
    "CustomerId",
    "OrderStatusId",
    "PaymentStatusId",
    "ShippingStatusId",
    "OrderSubTotalInclTax",
    "OrderSubtotalDiscountInclTax",
    "OrderSubtotalDiscountExclTax",
    "OrderTotal",
    "RefundedAmount",
    "OrderDiscount",
    "CurrencyRate",
    "CurrencyCode",
    "OrderDateTime",
];

/// One order, immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    order_id: String,
    customer_id: String,
    order_status_id: String,
    payment_status_id: String,
    shipping_status_id: String,
    subtotal_incl_tax: String,
    subtotal_discount_incl_tax: String,
    subtotal_discount_excl_tax: String,
    order_total: String,
    refunded_amount: String,
    order_discount: String,
    currency_rate: String,
    currency_code: String,
    order_date_time: String,
}

impl Order {
    /// Build an order from its 14 fields in positional order.
    pub fn from_fields(fields: [&str; FIELD_COUNT]) -> Self {
        let [
            order_id,
            customer_id,
            order_status_id,
            payment_status_id,
            shipping_status_id,
            subtotal_incl_tax,
            subtotal_discount_incl_tax,
            subtotal_discount_excl_tax,
            order_total,
            refunded_amount,
            order_discount,
            currency_rate,
            currency_code,
            order_date_time,
        ] = fields;
        Self {
            order_id: order_id.to_string(),
            customer_id: customer_id.to_string(),
            order_status_id: order_status_id.to_string(),
            payment_status_id: payment_status_id.to_string(),
            shipping_status_id: shipping_status_id.to_string(),
            subtotal_incl_tax: subtotal_incl_tax.to_string(),
            subtotal_discount_incl_tax: subtotal_discount_incl_tax.to_string(),
            subtotal_discount_excl_tax: subtotal_discount_excl_tax.to_string(),
            order_total: order_total.to_string(),
            refunded_amount: refunded_amount.to_string(),
            order_discount: order_discount.to_string(),
            currency_rate: currency_rate.to_string(),
            currency_code: currency_code.to_string(),
            order_date_time: order_date_time.to_string(),
        }
    }

    /// Parse one line of an order file.
    ///
    /// `line_no` is 1-based and only used for error reporting. A trailing
    /// `\n` or `\r\n` is stripped; anything else is kept verbatim.
    pub fn parse_line(line: &str, line_no: usize) -> Result<Self, IngestError> {
        let line = line.trim_end_matches(['\n', '\r']);
        let mut fields = [""; FIELD_COUNT];
        let mut count = 0usize;
        for token in line.split(DELIMITER) {
            if count < FIELD_COUNT {
                fields[count] = token;
            }
            count += 1;
        }
        if count != FIELD_COUNT {
            return Err(IngestError::MalformedRecord {
                line: line_no,
                fields: count,
            });
        }
        Ok(Self::from_fields(fields))
    }

    /// All fields in positional (wire) order
    pub fn fields(&self) -> [&str; FIELD_COUNT] {
        [
            &self.order_id,
            &self.customer_id,
            &self.order_status_id,
            &self.payment_status_id,
            &self.shipping_status_id,
            &self.subtotal_incl_tax,
            &self.subtotal_discount_incl_tax,
            &self.subtotal_discount_excl_tax,
            &self.order_total,
            &self.refunded_amount,
            &self.order_discount,
            &self.currency_rate,
            &self.currency_code,
            &self.order_date_time,
        ]
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    pub fn order_status_id(&self) -> &str {
        &self.order_status_id
    }

    pub fn payment_status_id(&self) -> &str {
        &self.payment_status_id
    }

    pub fn shipping_status_id(&self) -> &str {
        &self.shipping_status_id
    }

    pub fn subtotal_incl_tax(&self) -> &str {
        &self.subtotal_incl_tax
    }

    pub fn subtotal_discount_incl_tax(&self) -> &str {
        &self.subtotal_discount_incl_tax
    }

    pub fn subtotal_discount_excl_tax(&self) -> &str {
        &self.subtotal_discount_excl_tax
    }

    pub fn order_total(&self) -> &str {
        &self.order_total
    }

    pub fn refunded_amount(&self) -> &str {
        &self.refunded_amount
    }

    pub fn order_discount(&self) -> &str {
        &self.order_discount
    }

    pub fn currency_rate(&self) -> &str {
        &self.currency_rate
    }

    /// Currency code, bound as text on insert
    pub fn currency_code(&self) -> &str {
        &self.currency_code
    }

    /// Order timestamp, bound as text on insert
    pub fn order_date_time(&self) -> &str {
        &self.order_date_time
    }
}
