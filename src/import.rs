//! XML file → graph store import orchestration.

use std::io::Write;
use std::path::Path;

use crate::Result;
use crate::adapter::DbAdapter;
use crate::driver::GraphClient;
use crate::model::GraphEntity;
use crate::xml::XmlReader;

/// Import every entity from every given file, reporting progress line by
/// line on `out`.
///
/// The batch never aborts: a missing file or a failed entity is reported
/// and skipped, and a mid-stream parse error ends that file only. The
/// returned error covers the report writer alone.
pub fn import_files<C, W>(
    adapter: &mut DbAdapter<C>,
    paths: &[impl AsRef<Path>],
    mut out: W,
) -> Result<()>
where
    C: GraphClient,
    W: Write,
{
    for path in paths {
        let path = path.as_ref();

        if !path.exists() {
            writeln!(out, "File <{}> not found", path.display())?;
            continue;
        }

        writeln!(out, "Importing graph XML from <{}>", path.display())?;

        let reader = match XmlReader::open(path) {
            Ok(reader) => reader,
            Err(err) => {
                writeln!(out, "Error reading <{}>: {err}", path.display())?;
                continue;
            }
        };

        for entity in reader {
            match entity {
                Ok(GraphEntity::Node(node)) => match adapter.create_node(&node) {
                    Ok(created) => writeln!(
                        out,
                        "Created :{} node <{}>",
                        created.labels().join(":"),
                        created.uuid()
                    )?,
                    Err(err) => writeln!(out, "Error creating node: {err}")?,
                },
                Ok(GraphEntity::Relationship(relationship)) => {
                    match adapter.create_relationship(&relationship) {
                        Ok(created) => writeln!(
                            out,
                            "Created :{} relationship <{}>",
                            created.rel_type(),
                            created.uuid()
                        )?,
                        Err(err) => writeln!(out, "Error creating relationship: {err}")?,
                    }
                }
                // The reader ends itself after a parse error.
                Err(err) => writeln!(out, "Error reading <{}>: {err}", path.display())?,
            }
        }
    }

    Ok(())
}
