// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Plain-text rendering of a collated report.

use crate::collate::{CollatedReport, PathBucket};
use crate::walker::DocItemKind;
use std::io::{self, Write};

/// Write the collated report in a tabulated console layout: the
/// application first, then each router with its name and index, each as a
/// sequence of PATH blocks listing the items grouped under that path.
pub fn dump<W: Write>(report: &CollatedReport, out: &mut W) -> io::Result<()> {
    writeln!(out, "APP.")?;
    writeln!(out)?;
    dump_buckets(&report.app.buckets, out)?;

    for router in &report.routers {
        writeln!(out, "ROUTER:\t{}", router.name)?;
        match router.index {
            Some(index) => writeln!(out, "INDEX:\t{index}")?,
            None => writeln!(out, "INDEX:\t<unregistered>")?,
        }
        writeln!(out)?;
        dump_buckets(&router.buckets, out)?;
    }

    Ok(())
}

fn dump_buckets<W: Write>(buckets: &[PathBucket], out: &mut W) -> io::Result<()> {
    for bucket in buckets {
        writeln!(out, "\tPATH:\t{}", bucket.sort_key)?;
        writeln!(out)?;

        for entry in &bucket.items {
            writeln!(out, "\t\tTYPE:\t{}", kind_label(&entry.item.kind))?;
            if let DocItemKind::Method { verb } = &entry.item.kind {
                writeln!(out, "\t\tMETHOD:\t{verb}")?;
            }
            if let Some(doc) = &entry.item.doc {
                writeln!(out, "\t\tDOC:\t{doc}")?;
            }
            writeln!(out)?;
        }

        writeln!(out)?;
    }
    Ok(())
}

fn kind_label(kind: &DocItemKind) -> &'static str {
    match kind {
        DocItemKind::Method { .. } => "method",
        DocItemKind::Route => "route",
        DocItemKind::Container { .. } => "container",
        DocItemKind::ContainerRef { .. } => "container-ref",
        DocItemKind::Middleware { .. } => "middleware",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collate::collate;
    use crate::registry::{DocAnnotation, Registry};
    use crate::walker::walk;

    #[test]
    fn test_dump_layout() {
        let mut registry = Registry::new();
        let app = registry.application(None);
        registry
            .register_method(app, "get", "/", "root", Some(DocAnnotation::new("root")))
            .unwrap();

        let collated = collate(walk(registry.topology(), app, &registry).unwrap());
        let mut out = Vec::new();
        dump(&collated, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("APP.\n"));
        assert!(text.contains("\tPATH:\t|\n"));
        assert!(text.contains("\t\tTYPE:\tmethod\n"));
        assert!(text.contains("\t\tMETHOD:\tget\n"));
        assert!(text.contains("\t\tDOC:\troot\n"));
    }

    #[test]
    fn test_dump_router_heading() {
        let mut registry = Registry::new();
        let app = registry.application(None);
        let basic = registry.router(Some("basic"), None);
        registry
            .register_method(basic, "get", "/", "basic_root", None)
            .unwrap();
        registry.mount(app, "/basic/", basic, None).unwrap();

        let collated = collate(walk(registry.topology(), app, &registry).unwrap());
        let mut out = Vec::new();
        dump(&collated, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("ROUTER:\tbasic\n"));
        assert!(text.contains("INDEX:\t0\n"));
        assert!(text.contains("\t\tTYPE:\tcontainer-ref\n"));
    }
}
