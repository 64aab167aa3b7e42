//! Query → XML export orchestration.

use std::io::Write;

use crate::Result;
use crate::adapter::{DbAdapter, ResultCell};
use crate::db::DbQuery;
use crate::driver::GraphClient;
use crate::xml::XmlExporter;

/// Run each query and stream all results into one XML document on `out`.
///
/// Node and relationship columns become `<node>`/`<relationship>` elements
/// tagged with their result coordinates; scalar columns of a row collect
/// into a single `<row>` element. The run aborts on the first query
/// failure; whatever was already written stays written.
pub fn export_queries<C, W>(adapter: &mut DbAdapter<C>, queries: &[String], out: W) -> Result<()>
where
    C: GraphClient,
    W: Write,
{
    let mut exporter = XmlExporter::new(out);
    exporter.start_document()?;

    for query in queries {
        let rows = adapter.list_results(&DbQuery::with_query(query))?;

        for (row_number, row) in rows.iter().enumerate() {
            let mut scalars: Vec<(&str, String)> = Vec::new();

            for (column, cell) in row {
                let coordinates = [
                    ("rowNumber", row_number.to_string()),
                    ("columnName", column.clone()),
                ];

                match cell {
                    ResultCell::Node(node) => exporter.export_node(node, &coordinates)?,
                    ResultCell::Relationship(relationship) => {
                        exporter.export_relationship(relationship, &coordinates)?;
                    }
                    ResultCell::Scalar(scalar) => scalars.push((column.as_str(), scalar.to_text())),
                }
            }

            if !scalars.is_empty() {
                exporter.export_row(row_number, &scalars)?;
            }
        }
    }

    exporter.end_document()?;
    Ok(())
}
