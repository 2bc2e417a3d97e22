//! Built-in instruction library.

mod arithmetic;
mod common;
mod construction;
mod control;
mod logic;
mod navigation;
mod sets;
mod strings;
mod templates;

use crate::consts::TRANSFORMATION;
use crate::engine::language::{InstructionHandler, InstructionSpec, Language};

type Entry = (&'static str, Option<&'static str>, &'static [&'static str], InstructionHandler);

const SELECT: Option<&str> = Some("select");

#[rustfmt::skip]
const WORKING_DRAFT: &[Entry] = &[
    // ===== Navigation =====
    ("current",             None,           &[],                                   navigation::current),
    ("first",               SELECT,         &["select"],                           navigation::first),
    ("last",                SELECT,         &["select"],                           navigation::last),
    ("nth",                 SELECT,         &["select", "which"],                  navigation::nth),
    ("slice",               SELECT,         &["select", "from", "to"],             navigation::slice),
    ("children",            SELECT,         &["select"],                           navigation::children),
    ("parent",              SELECT,         &["select"],                           navigation::parent),
    ("child",               SELECT,         &["select", "name", "index", "which"], navigation::child),
    ("name",                SELECT,         &["select"],                           navigation::name),
    ("index",               SELECT,         &["select"],                           navigation::index),
    ("type",                SELECT,         &["select"],                           navigation::type_of),
    ("count",               SELECT,         &["select"],                           navigation::count),
    ("reverse",             SELECT,         &["select"],                           navigation::reverse),
    // ===== Equality and logic =====
    ("eq",                  SELECT,         &["select", "compare"],                logic::eq),
    ("sameNode",            SELECT,         &["select", "compare"],                logic::same_node),
    ("not",                 SELECT,         &["select"],                           logic::not),
    ("and",                 SELECT,         &["select", "compare"],                logic::and),
    ("or",                  SELECT,         &["select", "compare"],                logic::or),
    ("xor",                 SELECT,         &["select", "compare"],                logic::xor),
    ("any",                 SELECT,         &["select"],                           logic::any),
    ("all",                 SELECT,         &["select"],                           logic::all),
    ("true",                None,           &[],                                   logic::true_),
    ("false",               None,           &[],                                   logic::false_),
    ("null",                None,           &[],                                   logic::null),
    // ===== Sets =====
    ("union",               Some("test"),   &["select", "compare", "test"],        sets::union),
    ("intersection",        Some("test"),   &["select", "compare", "test"],        sets::intersection),
    ("symmetricDifference", Some("test"),   &["select", "compare", "test"],        sets::symmetric_difference),
    ("unique",              Some("test"),   &["select", "test"],                   sets::unique),
    // ===== Control flow =====
    ("forEach",             SELECT,         &["select", "produce"],                control::for_each),
    ("filter",              SELECT,         &["select", "test", "produce"],        control::filter),
    ("while",               SELECT,         &["select", "test", "produce"],        control::while_),
    ("if",                  Some("test"),   &["test", "produce"],                  control::if_),
    ("choose",              SELECT,         &["select", "templates"],              control::choose),
    ("reduce",              SELECT,         &["select", "produce"],                control::reduce),
    // ===== Construction =====
    ("literal",             None,           &["value"],                            construction::literal),
    ("array",               SELECT,         &["select"],                           construction::array),
    ("object",              SELECT,         &["select"],                           construction::object),
    ("nodeArray",           SELECT,         &["select"],                           construction::node_array),
    ("range",               SELECT,         &["select", "end"],                    construction::range),
    ("zip",                 SELECT,         &["select"],                           construction::zip),
    // ===== Arithmetic =====
    ("add",                 SELECT,         &["select", "compare"],                arithmetic::add),
    ("subtract",            SELECT,         &["select", "compare"],                arithmetic::subtract),
    ("multiply",            SELECT,         &["select", "compare"],                arithmetic::multiply),
    ("divide",              SELECT,         &["select", "compare"],                arithmetic::divide),
    ("modulo",              SELECT,         &["select", "compare"],                arithmetic::modulo),
    ("power",               SELECT,         &["select", "compare"],                arithmetic::power),
    // ===== Strings =====
    ("join",                SELECT,         &["select", "delimiter"],              strings::join),
    ("length",              SELECT,         &["select"],                           strings::length),
    // ===== Templates and variables =====
    (TRANSFORMATION,        Some("templates"), &["templates"],                     templates::transformation),
    ("template",            Some("produce"), &["name", "match", "produce"],        templates::template),
    ("declareTemplates",    SELECT,         &["select"],                           templates::declare_templates),
    ("variable",            SELECT,         &["name", "select"],                   templates::variable),
    ("callVariable",        Some("name"),   &["name"],                             templates::call_variable),
    ("applyTemplates",      SELECT,         &["select", "name"],                   templates::apply_templates),
    ("iteration",           None,           &[],                                   templates::iteration),
];

/// Register every built-in instruction with its metadata.
pub fn register_working_draft(language: &mut Language) {
    for (name, primary, attributes, handler) in WORKING_DRAFT {
        language.register(name, InstructionSpec::new(*primary, attributes), *handler);
    }
}
