use crate::*;

/// Two databases with overlapping column names; `shop` is the default.
pub fn sample_catalog() -> Catalog {
    use DataType::*;
    Catalog::new(vec![
        Database::new("shop")
            .with_table(Table::new_with_ordered(
                "users",
                [
                    ("id", Integer),
                    ("name", VarChar(Some(255))),
                    ("email", Text),
                    ("created_at", Timestamp),
                ],
            ))
            .with_table(Table::new_with_ordered(
                "orders",
                [
                    ("id", Integer),
                    ("user_id", Integer),
                    ("amount", Decimal(10, 2)),
                    ("status", VarChar(Some(32))),
                    ("created_at", Timestamp),
                ],
            ))
            .with_table(Table::new_with_ordered(
                "products",
                [("id", Integer), ("title", Text), ("price", Decimal(10, 2))],
            ))
            .with_table(
                Table::new_with_ordered(
                    "active_users",
                    [("id", Integer), ("name", VarChar(Some(255)))],
                )
                .into_view(),
            ),
        Database::new("analytics")
            .with_table(Table::new_with_ordered(
                "events",
                [
                    ("id", BigInt),
                    ("user_id", Integer),
                    ("event_type", Text),
                    ("occurred_at", Timestamptz),
                ],
            ))
            .with_table(Table::new_with_ordered(
                "sessions",
                [("id", BigInt), ("user_id", Integer), ("started_at", Timestamptz)],
            )),
    ])
    .with_default_database(Some("shop".into()))
}

/// Splits `|` out of `marked` and returns the text with the caret position
/// it marked.
pub fn caret(marked: &str) -> (String, CaretPosition) {
    let offset = marked.find('|').expect("marked text needs a caret");
    let sql = marked.replacen('|', "", 1);
    let position = CaretPosition::from_offset(&sql, offset);
    (sql, position)
}
