//! SQL rendering snapshots, each checked to parse under its dialect.

use insta::assert_snapshot;
use starlayer::model::{col, lit_float, Catalog, ColumnType, RelationshipGraph, TableCatalog, TableReference};
use starlayer::query::{FilterCondition, QueryPlan, QueryRequest, QueryTranslator, SortDirection};
use starlayer::registry::{InMemorySource, TableRegistry};
use starlayer::semantic::{ModelAssembler, SemanticModel};
use starlayer::sql::{validate_sql, Dialect};

fn model() -> SemanticModel {
    let source = InMemorySource::new()
        .with_table(
            "sales",
            &[
                ("store_key", ColumnType::Integer),
                ("amount", ColumnType::Float),
                ("_dlt_id", ColumnType::Text),
            ],
        )
        .with_table(
            "stores",
            &[
                ("store_key", ColumnType::Integer),
                ("name", ColumnType::Text),
            ],
        );
    let graph = RelationshipGraph::new()
        .with_reference(TableReference::new("sales", "stores", &["store_key"], &["store_key"]))
        .with_table("stores");
    let catalog = Catalog::new()
        .with_table(
            TableCatalog::new("sales")
                .with_measure("revenue", col("sales__amount").sum())
                .with_measure("orders", col("sales__store_key").count())
                .with_measure("halfRevenue", col("sales__amount").sum() / lit_float(2.0)),
        )
        .with_table(TableCatalog::new("stores").with_dimension("store", col("stores__name")));
    ModelAssembler::new(&graph, &catalog, "sales")
        .assemble(&TableRegistry::new(source))
        .unwrap()
}

fn plan(request: QueryRequest) -> QueryPlan {
    QueryTranslator::new(&model()).translate(&request).unwrap()
}

fn render(plan: &QueryPlan, dialect: Dialect) -> String {
    let sql = plan.to_sql(dialect);
    validate_sql(&sql, dialect).unwrap();
    sql
}

fn grouped() -> QueryPlan {
    plan(
        QueryRequest::new()
            .measure("revenue")
            .dimension("store")
            .filter(FilterCondition::equals("store", "Main"))
            .order_by("revenue", SortDirection::Desc)
            .limit(Some(10)),
    )
}

#[test]
fn grouped_duckdb() {
    assert_snapshot!(render(&grouped(), Dialect::DuckDb), @r#"
    SELECT "stores__name" AS "store", SUM("sales__amount") AS "revenue"
    FROM (SELECT "store_key" AS "sales__store_key", "amount" AS "sales__amount" FROM "sales") AS "sales"
    LEFT JOIN (SELECT "store_key" AS "stores__store_key", "name" AS "stores__name" FROM "stores") AS "stores" ON "sales"."sales__store_key" = "stores"."stores__store_key"
    WHERE "stores__name" = 'Main'
    GROUP BY "stores__name"
    ORDER BY "revenue" DESC
    LIMIT 10
    "#);
}

#[test]
fn grouped_tsql() {
    assert_snapshot!(render(&grouped(), Dialect::TSql), @r#"
    SELECT [stores__name] AS [store], SUM([sales__amount]) AS [revenue]
    FROM (SELECT [store_key] AS [sales__store_key], [amount] AS [sales__amount] FROM [sales]) AS [sales]
    LEFT JOIN (SELECT [store_key] AS [stores__store_key], [name] AS [stores__name] FROM [stores]) AS [stores] ON [sales].[sales__store_key] = [stores].[stores__store_key]
    WHERE [stores__name] = 'Main'
    GROUP BY [stores__name]
    ORDER BY [revenue] DESC
    OFFSET 0 ROWS FETCH NEXT 10 ROWS ONLY
    "#);
}

#[test]
fn aggregate_with_having_postgres() {
    let plan = plan(
        QueryRequest::new()
            .measure("revenue")
            .measure("orders")
            .filter(FilterCondition::new("orders", ">", 2_i64))
            .limit(None),
    );
    assert_snapshot!(render(&plan, Dialect::Postgres), @r#"
    SELECT SUM("sales__amount") AS "revenue", COUNT("sales__store_key") AS "orders"
    FROM (SELECT "store_key" AS "sales__store_key", "amount" AS "sales__amount" FROM "sales") AS "sales"
    LEFT JOIN (SELECT "store_key" AS "stores__store_key", "name" AS "stores__name" FROM "stores") AS "stores" ON "sales"."sales__store_key" = "stores"."stores__store_key"
    HAVING COUNT("sales__store_key") > 2
    "#);
}

#[test]
fn distinct_with_offset_sqlite() {
    let plan = plan(
        QueryRequest::new()
            .dimension("store")
            .filter(FilterCondition::new("store", "contains", "ai"))
            .limit(None)
            .offset(3),
    );
    assert_snapshot!(render(&plan, Dialect::Sqlite), @r#"
    SELECT DISTINCT "stores__name" AS "store"
    FROM (SELECT "store_key" AS "sales__store_key", "amount" AS "sales__amount" FROM "sales") AS "sales"
    LEFT JOIN (SELECT "store_key" AS "stores__store_key", "name" AS "stores__name" FROM "stores") AS "stores" ON "sales"."sales__store_key" = "stores"."stores__store_key"
    WHERE instr("stores__name", 'ai') > 0
    LIMIT -1 OFFSET 3
    "#);
}

#[test]
fn distinct_tsql_gets_an_order_for_pagination() {
    let plan = plan(
        QueryRequest::new()
            .dimension("store")
            .filter(FilterCondition::new("store", "!=", "Café"))
            .limit(Some(5))
            .offset(10),
    );
    assert_snapshot!(render(&plan, Dialect::TSql), @r#"
    SELECT DISTINCT [stores__name] AS [store]
    FROM (SELECT [store_key] AS [sales__store_key], [amount] AS [sales__amount] FROM [sales]) AS [sales]
    LEFT JOIN (SELECT [store_key] AS [stores__store_key], [name] AS [stores__name] FROM [stores]) AS [stores] ON [sales].[sales__store_key] = [stores].[stores__store_key]
    WHERE [stores__name] <> N'Café'
    ORDER BY 1
    OFFSET 10 ROWS FETCH NEXT 5 ROWS ONLY
    "#);
}

#[test]
fn whole_float_literals_keep_their_decimal_point() {
    let plan = plan(
        QueryRequest::new()
            .measure("halfRevenue")
            .dimension("store")
            .filter(FilterCondition::new("store", "contains", "ai"))
            .filter(FilterCondition::new("halfRevenue", ">=", 100.0))
            .limit(None),
    );
    assert_snapshot!(render(&plan, Dialect::Postgres), @r#"
    SELECT "stores__name" AS "store", SUM("sales__amount") / 2.0 AS "halfRevenue"
    FROM (SELECT "store_key" AS "sales__store_key", "amount" AS "sales__amount" FROM "sales") AS "sales"
    LEFT JOIN (SELECT "store_key" AS "stores__store_key", "name" AS "stores__name" FROM "stores") AS "stores" ON "sales"."sales__store_key" = "stores"."stores__store_key"
    WHERE strpos(CAST("stores__name" AS VARCHAR), 'ai') > 0
    GROUP BY "stores__name"
    HAVING SUM("sales__amount") / 2.0 >= 100.0
    "#);
}

#[test]
fn every_dialect_parses_every_shape() {
    let plans = [
        grouped(),
        plan(QueryRequest::new().measure("revenue")),
        plan(QueryRequest::new().dimension("store").offset(2)),
        plan(
            QueryRequest::new()
                .measure("orders")
                .dimension("store")
                .filter(FilterCondition::new("store", "contains", "it's"))
                .filter(FilterCondition::new("revenue", "<=", 99.5))
                .order_by("store", SortDirection::Asc),
        ),
    ];
    for plan in &plans {
        for dialect in Dialect::all() {
            render(plan, dialect);
        }
    }
}

#[test]
fn bookkeeping_columns_never_reach_sql() {
    for dialect in Dialect::all() {
        assert!(!grouped().to_sql(dialect).contains("_dlt_"));
    }
}
