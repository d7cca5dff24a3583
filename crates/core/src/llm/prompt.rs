use crate::domain::product::LoanProduct;

/// Renders one catalog product as a single comma-delimited line. The advisor
/// prompts are built from these lines only, so everything the model may state
/// about a product has to be present here.
pub fn render_product_line(p: &LoanProduct) -> String {
    let apr = match (p.min_apr, p.max_apr) {
        (Some(lo), Some(hi)) => format!("{}% (Range: {lo}% - {hi}%)", p.apr),
        _ => format!("{}%", p.apr),
    };

    let min_income = p
        .min_income
        .map(|v| format!("${}", format_usd(v)))
        .unwrap_or_else(|| "N/A".to_string());

    let tenure = format!(
        "{} - {} months",
        p.tenure_min_months
            .map(|v| v.to_string())
            .unwrap_or_else(|| "N/A".to_string()),
        p.tenure_max_months
            .map(|v| v.to_string())
            .unwrap_or_else(|| "N/A".to_string()),
    );

    let features = if p.features.is_empty() {
        "None".to_string()
    } else {
        p.features.join(", ")
    };

    let summary = p
        .summary
        .as_deref()
        .or(p.description.as_deref())
        .unwrap_or("N/A");

    format!(
        "Bank: {}, Product: {}, Loan Type: {}, APR: {apr}, Loan Amount: ${} - ${}, \
         Min Credit Score: {}, Min Income: {min_income}, Tenure: {tenure}, Features: {features}, \
         Processing Time: {}, Summary: {summary}",
        p.bank_name,
        p.product_name,
        p.loan_type.as_deref().unwrap_or("N/A"),
        format_usd(p.loan_amount_min),
        format_usd(p.loan_amount_max),
        p.min_credit_score,
        p.processing_time.as_deref().unwrap_or("N/A"),
    )
}

/// System instruction grounding the advisor in the full catalog. Errors on an
/// empty catalog: an advisor with no ground truth would be free to fabricate.
pub fn catalog_system_prompt(products: &[LoanProduct]) -> anyhow::Result<String> {
    anyhow::ensure!(
        !products.is_empty(),
        "cannot build advisor context from an empty catalog"
    );

    let lines: Vec<String> = products.iter().map(render_product_line).collect();

    Ok(format!(
        "You are a helpful financial advisor specializing in personal loans.\n\n\
         IMPORTANT: You MUST ONLY use the loan product data provided below. Do not make up or \
         reference any products, banks, rates, or features that are not in the provided data. \
         If asked about something not in the data, politely say you don't have that information \
         in your database.\n\n\
         Available Loan Products:\n{}\n\n\
         Provide clear, concise advice about these loan products, APR rates, and help users find \
         the best match based on their needs. Always be professional and helpful. When \
         recommending products, reference specific banks and products from the data above.",
        lines.join("\n")
    ))
}

/// System instruction for a conversation scoped to one product.
pub fn product_system_prompt(product: &LoanProduct) -> String {
    format!(
        "You are a helpful financial advisor specializing in personal loans.\n\n\
         IMPORTANT: You MUST ONLY use the loan product data provided below. This is the ONLY \
         product you should discuss. Do not make up or reference any other products, banks, \
         rates, or features that are not in the provided data. If asked about something not in \
         the data, politely say you don't have that information.\n\n\
         Product Details:\n{}\n\n\
         Provide clear, concise advice about THIS SPECIFIC loan product. Answer questions about \
         APR, eligibility, features, tenure, and any other aspects of this product. Always be \
         professional and helpful.",
        render_product_line(product)
    )
}

/// Groups whole dollars with thousands separators. Catalog amounts are whole
/// dollars; fractional cents are rounded away.
fn format_usd(amount: f64) -> String {
    let whole = amount.round() as i64;
    let negative = whole < 0;
    let digits = whole.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn sample(seed: u8, bank: &str) -> LoanProduct {
        LoanProduct {
            id: Uuid::from_bytes([seed; 16]),
            bank_name: bank.to_string(),
            product_name: format!("{bank} Flex Loan"),
            loan_type: Some("Personal".to_string()),
            apr: 6.5,
            min_apr: Some(5.0),
            max_apr: Some(8.0),
            loan_amount_min: 5_000.0,
            loan_amount_max: 50_000.0,
            min_credit_score: 650,
            min_income: Some(30_000.0),
            tenure_min_months: Some(12),
            tenure_max_months: Some(60),
            features: vec!["No origination fee".to_string(), "Autopay discount".to_string()],
            processing_time: Some("2-3 business days".to_string()),
            description: Some("A flexible personal loan.".to_string()),
            summary: Some("Flexible terms, fast payout.".to_string()),
        }
    }

    #[test]
    fn renders_all_fields_on_one_line() {
        let line = render_product_line(&sample(1, "Acme"));
        assert!(!line.contains('\n'));
        assert!(!line.contains(';'));
        assert!(line.contains("Bank: Acme"));
        assert!(line.contains("APR: 6.5% (Range: 5% - 8%)"));
        assert!(line.contains("Loan Amount: $5,000 - $50,000"));
        assert!(line.contains("Min Income: $30,000"));
        assert!(line.contains("Tenure: 12 - 60 months"));
        assert!(line.contains("Features: No origination fee, Autopay discount"));
        assert!(line.contains("Summary: Flexible terms, fast payout."));
    }

    #[test]
    fn renders_fallbacks_for_missing_fields() {
        let mut p = sample(1, "Acme");
        p.loan_type = None;
        p.min_apr = None;
        p.max_apr = None;
        p.min_income = None;
        p.tenure_min_months = None;
        p.tenure_max_months = None;
        p.features = vec![];
        p.processing_time = None;
        p.summary = None;
        p.description = None;

        let line = render_product_line(&p);
        assert!(line.contains("Loan Type: N/A"));
        assert!(line.contains("APR: 6.5%,"));
        assert!(line.contains("Min Income: N/A"));
        assert!(line.contains("Tenure: N/A - N/A months"));
        assert!(line.contains("Features: None"));
        assert!(line.contains("Processing Time: N/A"));
        assert!(line.contains("Summary: N/A"));
    }

    #[test]
    fn summary_falls_back_to_description() {
        let mut p = sample(1, "Acme");
        p.summary = None;
        let line = render_product_line(&p);
        assert!(line.contains("Summary: A flexible personal loan."));
    }

    #[test]
    fn catalog_prompt_has_one_line_per_product_in_order() {
        let products = vec![sample(1, "Alpha"), sample(2, "Beta"), sample(3, "Gamma")];
        let prompt = catalog_system_prompt(&products).unwrap();

        let alpha = prompt.find("Bank: Alpha").unwrap();
        let beta = prompt.find("Bank: Beta").unwrap();
        let gamma = prompt.find("Bank: Gamma").unwrap();
        assert!(alpha < beta && beta < gamma);
        assert_eq!(prompt.matches("Bank: ").count(), 3);
    }

    #[test]
    fn catalog_prompt_rejects_empty_catalog() {
        assert!(catalog_system_prompt(&[]).is_err());
    }

    #[test]
    fn single_product_prompt_excludes_other_products() {
        let only = sample(1, "Alpha");
        let prompt = product_system_prompt(&only);
        assert!(prompt.contains("Bank: Alpha"));
        assert!(!prompt.contains("Beta"));
        assert!(prompt.contains("ONLY product"));
    }

    #[test]
    fn groups_thousands() {
        assert_eq!(format_usd(0.0), "0");
        assert_eq!(format_usd(999.0), "999");
        assert_eq!(format_usd(5_000.0), "5,000");
        assert_eq!(format_usd(1_234_567.0), "1,234,567");
    }
}
