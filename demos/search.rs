use row_predicate_optimizer::{evaluate, Filter, Row};

fn main() {
    tracing_subscriber::fmt::init();

    let high_value_us_order = Filter::all_of([
        Filter::field("country").eq("US"),
        Filter::any_of([
            Filter::field("segment").eq("gold"),
            Filter::field("segment").eq("platinum"),
        ]),
        Filter::field("total").between("100", "1000").build(),
    ]);

    let expired_or_flagged = Filter::any_of([
        Filter::not(Filter::field("status").eq("active")),
        Filter::field("flagged").eq("true"),
    ]);

    let predicates = [
        ("high value US order", &high_value_us_order),
        ("expired or flagged", &expired_or_flagged),
    ];

    let rows = [
        Row::from([
            ("country", "US"),
            ("segment", "gold"),
            ("total", "250"),
            ("status", "active"),
            ("flagged", "false"),
        ]),
        Row::from([
            ("country", "CA"),
            ("segment", "silver"),
            ("total", "5000"),
            ("status", "expired"),
            ("flagged", "false"),
        ]),
    ];

    for (i, row) in rows.iter().enumerate() {
        for (name, predicate) in &predicates {
            println!("row {i}: {name} -> {}", evaluate(predicate, row));
        }
    }
}
