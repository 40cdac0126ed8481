//! Statement type definitions.
//!
//! This module defines [`StatementKind`], the fixed whitelist of financial
//! statements requested from the structured-report service, and
//! [`DocumentKind`] which separates structured from eventual filings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A financial statement retrievable from a structured filing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatementKind {
    /// Balance sheet, assets side.
    BalanceSheetAssets,
    /// Balance sheet, liabilities and equity side.
    BalanceSheetLiabilities,
    /// Income statement.
    IncomeStatement,
    /// Statement of comprehensive income.
    ComprehensiveIncome,
    /// Cash flow statement.
    CashFlow,
    /// Statement of changes in equity.
    ChangesInEquity,
    /// Value-added statement.
    ValueAdded,
}

impl StatementKind {
    /// Every statement kind, in the order their lines are emitted.
    pub const ALL: [Self; 7] = [
        Self::BalanceSheetAssets,
        Self::BalanceSheetLiabilities,
        Self::IncomeStatement,
        Self::ComprehensiveIncome,
        Self::CashFlow,
        Self::ChangesInEquity,
        Self::ValueAdded,
    ];

    /// Name of the statement as the report service knows it.
    #[must_use]
    pub const fn source_name(&self) -> &'static str {
        match self {
            Self::BalanceSheetAssets => "Balanço Patrimonial Ativo",
            Self::BalanceSheetLiabilities => "Balanço Patrimonial Passivo",
            Self::IncomeStatement => "Demonstração do Resultado",
            Self::ComprehensiveIncome => "Demonstração do Resultado Abrangente",
            Self::CashFlow => "Demonstração do Fluxo de Caixa",
            Self::ChangesInEquity => "Demonstração das Mutações do Patrimônio Líquido",
            Self::ValueAdded => "Demonstração de Valor Adicionado",
        }
    }

    /// Canonical structure label attached to every normalized line.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::BalanceSheetAssets => "BALANCO_PATRIMONIAL_ATIVO",
            Self::BalanceSheetLiabilities => "BALANCO_PATRIMONIAL_PASSIVO",
            Self::IncomeStatement => "DEMONSTRACAO_RESULTADO",
            Self::ComprehensiveIncome => "DEMONSTRACAO_RESULTADO_ABRANGENTE",
            Self::CashFlow => "DEMONSTRACAO_FLUXO_CAIXA",
            Self::ChangesInEquity => "DEMONSTRACAO_MUTUACOES_PATRIMONIO_LIQUIDO",
            Self::ValueAdded => "DEMONSTRACAO_VALOR_ADICIONADO",
        }
    }

    /// Looks up a statement kind by its report-service name.
    #[must_use]
    pub fn from_source_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.source_name() == name)
    }

    /// Report-service names of the whole whitelist.
    #[must_use]
    pub fn source_names() -> Vec<&'static str> {
        Self::ALL.iter().map(Self::source_name).collect()
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether a filing category carries structured statements or an opaque document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    /// Statements retrievable line by line from the report service.
    Structured,
    /// Eventual filings, available only as a binary document.
    #[default]
    Eventual,
}

impl DocumentKind {
    /// Category codes of structured filings start with this prefix.
    pub const STRUCTURED_PREFIX: &'static str = "EST";

    /// Classifies a category code.
    #[must_use]
    pub fn from_category_code(code: &str) -> Self {
        if code.trim_start().starts_with(Self::STRUCTURED_PREFIX) {
            Self::Structured
        } else {
            Self::Eventual
        }
    }

    /// Lowercase label used in exported tables.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Structured => "estruturados",
            Self::Eventual => "eventuais",
        }
    }
}
