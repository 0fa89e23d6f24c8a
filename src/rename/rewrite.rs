//! Rewriting a single usage attribute to refer to a new name.

use crate::syntax::{AttrValue, Attribute, Unit};

use super::edit::{EditList, TextEdit};

/// Replace the first occurrence of `old` in `text`, which starts at byte
/// offset `start` of the document.
fn replace_first(text: &str, start: usize, old: &str, new: &str) -> Option<TextEdit> {
    let index = text.find(old)?;
    let at = start + index;
    Some(TextEdit::replace(at..at + old.len(), new))
}

/// Record the edits that make `attr` refer to `new` instead of `old`.
///
/// Matching is by substring, so a value such as `FooBar | Foo` has its first
/// `Foo` rewritten when renaming `Foo`.
pub fn rename_in_attribute(unit: &Unit, attr: &Attribute, old: &str, new: &str, edits: &mut EditList) {
    match &attr.value {
        Some(AttrValue::Scalar(scalar)) => {
            // The key carries the reference when the value does not, e.g. `(internal): true`.
            let edit = replace_first(&scalar.text, scalar.range.start, old, new)
                .or_else(|| replace_first(&attr.name, attr.name_range.start, old, new));
            if let Some(edit) = edit {
                edits.push(edit);
            }
            return;
        }
        Some(AttrValue::Structured(structured)) if structured.value_name.contains(old) => {
            if let Some(converted) = unit.structured_to_high_level(attr, structured) {
                if converted.is_annotation_type() {
                    edits.push(TextEdit::replace(converted.name_range, format!("({new})")));
                    return;
                }
                for key in converted.attributes.iter().filter(|a| a.is_key) {
                    if let Some(AttrValue::Scalar(scalar)) = &key.value {
                        if let Some(edit) = replace_first(&scalar.text, scalar.range.start, old, new) {
                            edits.push(edit);
                        }
                    }
                }
                return;
            }
        }
        _ => {}
    }

    match attr.value {
        Some(_) => edits.push(TextEdit::replace(attr.value_span.clone(), new)),
        None => edits.push(TextEdit::insert(attr.value_span.start, format!(" {new}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::DeclarationKind;
    use indoc::indoc;

    fn rename_usages(text: &str, kind: DeclarationKind, old: &str, new: &str) -> String {
        let unit = Unit::parse(text);
        let declaration = unit.declaration(kind, old).unwrap();
        let mut edits = EditList::new();
        for usage in unit.usages_of(declaration).iter().rev() {
            rename_in_attribute(&unit, usage, old, new, &mut edits);
        }
        edits.apply(text).0
    }

    #[test]
    fn scalar_values_are_replaced_in_place() {
        let text = indoc! {"
            types:
              Item: object
              Bag:
                type: Item[]
        "};
        let renamed = rename_usages(text, DeclarationKind::Type, "Item", "Entry");
        assert!(renamed.contains("type: Entry[]"));
        assert!(renamed.contains("  Item: object"));
    }

    #[test]
    fn only_the_first_occurrence_is_replaced() {
        let text = indoc! {"
            types:
              Foo: object
              FooBar: object
              Either:
                type: FooBar | Foo
        "};
        let renamed = rename_usages(text, DeclarationKind::Type, "Foo", "Baz");
        assert!(renamed.contains("type: BazBar | Foo"));
    }

    #[test]
    fn annotation_keys_are_rewritten_with_parentheses() {
        let text = indoc! {"
            annotationTypes:
              audit:
                properties:
                  level: string
            /orders:
              (audit):
                level: high
        "};
        let renamed = rename_usages(text, DeclarationKind::AnnotationType, "audit", "tracked");
        assert!(renamed.contains("  (tracked):\n    level: high"));
    }

    #[test]
    fn annotation_without_value_is_renamed_through_its_key() {
        let text = "annotationTypes:\n  internal: nil\n/a:\n  (internal):\n";
        let renamed = rename_usages(text, DeclarationKind::AnnotationType, "internal", "private");
        assert_eq!(renamed, "annotationTypes:\n  internal: nil\n/a:\n  (private):\n");
    }

    #[test]
    fn scalar_annotation_value_is_renamed_through_its_key() {
        let text = "annotationTypes:\n  internal: boolean\n/a:\n  (internal): true\n";
        let renamed = rename_usages(text, DeclarationKind::AnnotationType, "internal", "hidden");
        assert!(renamed.ends_with("  (hidden): true\n"));
    }

    #[test]
    fn structured_values_rewrite_their_key() {
        let text = indoc! {"
            traits:
              paged:
                queryParameters:
                  size: integer
            /items:
              is:
                - paged:
                    size: 10
        "};
        let renamed = rename_usages(text, DeclarationKind::Trait, "paged", "pageable");
        assert!(renamed.contains("    - pageable:\n        size: 10"));
    }

    #[test]
    fn missing_value_gets_the_new_name() {
        let unit = Unit::parse("types:\n  A:\n    type:\n");
        let declaration = unit.declaration(DeclarationKind::Type, "A").unwrap();
        let attrs = unit.attributes(declaration.node);
        let mut edits = EditList::new();
        rename_in_attribute(&unit, &attrs[1], "X", "B", &mut edits);
        assert_eq!(edits.apply(unit.text()).0, "types:\n  A:\n    type: B\n");
    }
}
