//! Bulk derivation of members from the properties of every class in a
//! collection.
//!
//! Both helpers only add members a class does not declare yet, and the
//! merge passes keep whatever the target file already has.

use phpgen_ast::Modifiers;
use tracing::debug;

use crate::{
    BuilderCollection, ClassBuilder, ConstSpec, FileSpec, MethodSpec, PropertySpec, ValueSpec,
};

/// Add a getter for every property that has no method of that name.
///
/// `name_filter` turns a property name into the getter name (for example
/// [`phpgen_core::getter_name`]). Classes for which `skip` returns `true`
/// are left alone. Returns the number of getters added.
pub fn add_getter_methods_for_properties<T: FileSpec>(
    collection: &mut BuilderCollection<T>,
    typed: bool,
    name_filter: impl Fn(&str) -> String,
    skip: impl Fn(&ClassBuilder) -> bool,
) -> usize {
    let mut added = 0;
    for class in collection.iter_mut().filter_map(FileSpec::as_class_mut) {
        if skip(&*class) {
            continue;
        }
        let getters: Vec<MethodSpec> = class
            .properties()
            .iter()
            .map(|property| getter(property, name_filter(property.name()), typed))
            .filter(|method| !class.has_method(method.name()))
            .collect();
        for method in getters {
            debug!(class = ?class.name(), method = method.name(), "adding getter");
            class.add_method(method);
            added += 1;
        }
    }
    added
}

fn getter(property: &PropertySpec, name: String, typed: bool) -> MethodSpec {
    let (body, modifiers) = if property.is_static() {
        (format!("return self::${};", property.name()), Modifiers::PUBLIC | Modifiers::STATIC)
    } else {
        (format!("return $this->{};", property.name()), Modifiers::PUBLIC)
    };
    let method = MethodSpec::new(name)
        .with_modifiers(modifiers)
        .typed(typed)
        .body(body);
    match property.type_spec() {
        Some(ty) => method.returns(ty.clone()),
        None => method,
    }
}

/// Add a class constant for every property name.
///
/// `name_filter` gives the constant name and `value_filter` its value, both
/// from the property name. Constants a class already has are kept. Returns
/// the number of constants added.
pub fn add_class_constants_for_properties<T: FileSpec>(
    collection: &mut BuilderCollection<T>,
    name_filter: impl Fn(&str) -> String,
    value_filter: impl Fn(&str) -> ValueSpec,
    skip: impl Fn(&ClassBuilder) -> bool,
    visibility: Modifiers,
) -> usize {
    let mut added = 0;
    for class in collection.iter_mut().filter_map(FileSpec::as_class_mut) {
        if skip(&*class) {
            continue;
        }
        let constants: Vec<ConstSpec> = class
            .properties()
            .iter()
            .map(|property| {
                ConstSpec::new(name_filter(property.name()), value_filter(property.name()))
                    .with_modifiers(visibility)
            })
            .filter(|constant| !class.has_constant(constant.name()))
            .collect();
        for constant in constants {
            class.add_constant(constant);
            added += 1;
        }
    }
    added
}

#[cfg(test)]
mod tests {
    use phpgen_ast::{Parser, PhpParser, PhpPrinter, Printer};
    use phpgen_core::{getter_name, to_screaming_snake_case};

    use super::*;
    use crate::{FileBuilder, InterfaceBuilder, Pipeline};

    fn user() -> ClassBuilder {
        let mut user = ClassBuilder::from_scratch("User");
        user.add_property(PropertySpec::new("first_name").private().ty("string".parse().unwrap()))
            .add_property(PropertySpec::new("age").private().ty("?int".parse().unwrap()))
            .add_method(MethodSpec::new("getAge").returns("int".parse().unwrap()).body("return $this->age ?? 0;"));
        user
    }

    fn print(class: &ClassBuilder) -> String {
        let parser = PhpParser::new();
        let mut ast = parser.parse("").unwrap();
        let mut pipeline = Pipeline::new();
        class.inject_visitors(&mut pipeline, &parser);
        pipeline.run(&mut ast).unwrap();
        PhpPrinter::default().print(&ast)
    }

    #[test]
    fn test_getters_skip_existing_methods() {
        let mut collection: BuilderCollection<_> = [user()].into_iter().collect();
        let added = add_getter_methods_for_properties(&mut collection, true, getter_name, |_| false);
        assert_eq!(added, 1);

        let class = collection.iter().next().unwrap();
        assert_eq!(class.methods().names(), vec!["getAge", "getFirstName"]);
        insta::assert_snapshot!(print(class), @r"
<?php

declare(strict_types=1);

class User
{
    private string $first_name;

    private ?int $age;

    public function getAge(): int
    {
        return $this->age ?? 0;
    }

    public function getFirstName(): string
    {
        return $this->first_name;
    }
}
");

        // running again adds nothing
        assert_eq!(add_getter_methods_for_properties(&mut collection, true, getter_name, |_| false), 0);
    }

    #[test]
    fn test_untyped_static_getter() {
        let mut counter = ClassBuilder::from_scratch("Counter");
        counter.add_property(
            PropertySpec::new("count")
                .modifier(Modifiers::STATIC)
                .ty("int".parse().unwrap()),
        );
        let mut collection: BuilderCollection<_> = [counter].into_iter().collect();
        add_getter_methods_for_properties(&mut collection, false, getter_name, |_| false);

        let method = collection.iter().next().unwrap().method("getCount").unwrap();
        assert!(method.modifiers().is_static());
        assert!(!method.is_typed());
        assert_eq!(method.body_source(), Some("return self::$count;"));
    }

    #[test]
    fn test_skip_and_interfaces() {
        let mut value_object = ClassBuilder::from_scratch("Money");
        value_object.set_final(true).add_property(PropertySpec::new("amount"));
        let mut collection: BuilderCollection<FileBuilder> = [
            FileBuilder::from(user()),
            value_object.into(),
            InterfaceBuilder::from_scratch("Named").into(),
        ]
        .into_iter()
        .collect();

        let added =
            add_getter_methods_for_properties(&mut collection, true, getter_name, ClassBuilder::is_final);
        assert_eq!(added, 1);
    }

    #[test]
    fn test_constants_for_properties() {
        let mut user = user();
        user.add_constant(ConstSpec::new("AGE", ValueSpec::new("years")));
        let mut collection: BuilderCollection<_> = [user].into_iter().collect();

        let added = add_class_constants_for_properties(
            &mut collection,
            to_screaming_snake_case,
            |name| ValueSpec::new(name),
            |_| false,
            Modifiers::PUBLIC,
        );
        assert_eq!(added, 1);

        let class = collection.iter().next().unwrap();
        assert_eq!(class.constants().names(), vec!["AGE", "FIRST_NAME"]);
        assert_eq!(class.constant("AGE").unwrap().value(), &ValueSpec::new("years"));
        assert_eq!(
            class.constant("FIRST_NAME").unwrap().value(),
            &ValueSpec::new("first_name")
        );
    }
}
