//! Built-in semantic definitions for the Contoso retail star schema.
//!
//! ```text
//! fact_sales (fact)
//! ├── dim_customer (customer_key)
//! ├── dim_store    (store_key)
//! ├── dim_product  (product_key)
//! └── dim_date     (order_date -> date)
//! ```
//!
//! Column names follow the loader's snake_case normalization of the CSV headers
//! (`CountryName` -> `country_name`).

use crate::model::catalog::{Catalog, TableCatalog};
use crate::model::expr::col;
use crate::model::references::{RelationshipGraph, TableReference};

/// The fact table every query is anchored on.
pub const ROOT: &str = "fact_sales";

pub fn relationship_graph() -> RelationshipGraph {
    RelationshipGraph::new()
        .with_reference(TableReference::new(
            "fact_sales",
            "dim_customer",
            &["customer_key"],
            &["customer_key"],
        ))
        .with_reference(TableReference::new(
            "fact_sales",
            "dim_store",
            &["store_key"],
            &["store_key"],
        ))
        .with_reference(TableReference::new(
            "fact_sales",
            "dim_product",
            &["product_key"],
            &["product_key"],
        ))
        .with_reference(TableReference::new(
            "fact_sales",
            "dim_date",
            &["order_date"],
            &["date"],
        ))
        .with_table("dim_customer")
        .with_table("dim_store")
        .with_table("dim_product")
        .with_table("dim_date")
}

pub fn catalog() -> Catalog {
    Catalog::new()
        .with_table(sales())
        .with_table(customers())
        .with_table(products())
        .with_table(stores())
        .with_table(dates())
}

fn sales() -> TableCatalog {
    TableCatalog::new("fact_sales")
        .with_dimension("orderdate", col("fact_sales__order_date"))
        .with_dimension("deliverydate", col("fact_sales__delivery_date"))
        .with_dimension("currencycode", col("fact_sales__currency_code"))
        .with_dimension("exchangerate", col("fact_sales__exchange_rate"))
        .with_measure(
            "totalRevenue",
            (col("fact_sales__unit_price") * col("fact_sales__quantity")).sum(),
        )
        .with_measure("netRevenue", col("fact_sales__net_price").sum())
        .with_measure("totalUnitsSold", col("fact_sales__quantity").sum())
        .with_measure(
            "totalCost",
            (col("fact_sales__unit_cost") * col("fact_sales__quantity")).sum(),
        )
        .with_measure("orderCount", col("fact_sales__order_key").count_distinct())
        .with_measure("averageOrderValue", col("fact_sales__net_price").mean())
        .with_measure(
            "profit",
            (col("fact_sales__net_price")
                - col("fact_sales__unit_cost") * col("fact_sales__quantity"))
            .sum(),
        )
}

fn customers() -> TableCatalog {
    TableCatalog::new("dim_customer")
        .with_dimension("surname", col("dim_customer__surname"))
        .with_dimension("gender", col("dim_customer__gender"))
        .with_dimension("continent", col("dim_customer__continent"))
        .with_dimension("country", col("dim_customer__country_full"))
        .with_dimension("city", col("dim_customer__city"))
        .with_dimension("state", col("dim_customer__state"))
        .with_dimension("company", col("dim_customer__company"))
        .with_dimension("vehicle", col("dim_customer__vehicle"))
        .with_dimension("age", col("dim_customer__age"))
        .with_dimension("birthday", col("dim_customer__birthday"))
        .with_dimension("occupation", col("dim_customer__occupation"))
        .with_measure(
            "customerCount",
            col("dim_customer__customer_key").count_distinct(),
        )
        .with_measure("avgCustomerAge", col("dim_customer__age").mean())
}

fn products() -> TableCatalog {
    TableCatalog::new("dim_product")
        .with_dimension("productname", col("dim_product__product_name"))
        .with_dimension("manufacturer", col("dim_product__manufacturer"))
        .with_dimension("brand", col("dim_product__brand"))
        .with_dimension("color", col("dim_product__color"))
        .with_dimension("weight", col("dim_product__weight"))
        .with_dimension("cost", col("dim_product__cost"))
        .with_dimension("price", col("dim_product__price"))
        .with_dimension("categoryname", col("dim_product__category_name"))
        .with_dimension("subcategoryname", col("dim_product__sub_category_name"))
        .with_measure(
            "productCount",
            col("dim_product__product_key").count_distinct(),
        )
}

fn stores() -> TableCatalog {
    TableCatalog::new("dim_store")
        .with_dimension("storecode", col("dim_store__store_code"))
        .with_dimension("countrycode", col("dim_store__country_code"))
        .with_dimension("countryname", col("dim_store__country_name"))
        .with_dimension("store_state", col("dim_store__state"))
        .with_dimension("opendate", col("dim_store__open_date"))
        .with_dimension("closedate", col("dim_store__close_date"))
        .with_dimension("squaremeters", col("dim_store__square_meters"))
        .with_dimension("status", col("dim_store__status"))
        .with_measure("storeCount", col("dim_store__store_key").count_distinct())
        .with_measure("averageStoreSize", col("dim_store__square_meters").mean())
}

fn dates() -> TableCatalog {
    TableCatalog::new("dim_date")
        .with_dimension("date", col("dim_date__date"))
        .with_dimension("year", col("dim_date__year"))
        .with_dimension("quarter", col("dim_date__quarter"))
        .with_dimension("yearmonth", col("dim_date__year_month"))
        .with_dimension("month", col("dim_date__month"))
        .with_dimension("dayofweek", col("dim_date__dayof_week"))
        .with_dimension("workingday", col("dim_date__working_day"))
}
