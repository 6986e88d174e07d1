mod document;
mod report;

pub use document::{
    load_document, Document, DocumentItem, RawDiscount, RawDocument, RawGroup, RawLine,
    RawPayment,
};
pub use report::{ReportData, ReportLine, ReportPayment, ReportTax, ScheduleData};
