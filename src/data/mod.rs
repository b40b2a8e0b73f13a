//! Panel data: loading, the column table, and derived variables.

pub mod derive;
pub mod frame;
pub mod load;

pub use derive::*;
pub use frame::*;
pub use load::*;

/// Column names used by the pipeline.
pub mod cols {
    pub const STATE: &str = "state";
    pub const YEAR: &str = "year";
    pub const CPI: &str = "cpi";
    pub const POPULATION: &str = "population";
    pub const PACKS: &str = "packs";
    pub const INCOME: &str = "income";
    pub const TAX: &str = "tax";
    pub const PRICE: &str = "price";
    pub const TAXS: &str = "taxs";

    pub const RPRICE: &str = "rprice";
    pub const SALESTAX: &str = "salestax";
    pub const LPACKS: &str = "lpacks";
    pub const LRPRICE: &str = "lrprice";
    pub const LPOP: &str = "lpop";
    pub const LRINCOME: &str = "lrincome";
    pub const LRPRICE_HAT: &str = "lrprice_hat";
    pub const OLS_RESID: &str = "ols_resid";

    /// Numeric columns every input file must provide.
    pub const REQUIRED: [&str; 8] = [YEAR, CPI, POPULATION, PACKS, INCOME, TAX, PRICE, TAXS];

    /// Exogenous controls added to the IV and endogeneity regressions.
    pub const CONTROLS: [&str; 2] = [LPOP, LRINCOME];
}
