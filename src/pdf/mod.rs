mod typst;

pub use typst::generate_payslip_pdf;
