//! Default tables for [`super::SemaConfig`]

use super::DualMethod;

pub fn default_dual_methods() -> Vec<DualMethod> {
    let mut duals = Vec::new();
    for class in [
        "java.util.Optional",
        "java.util.OptionalInt",
        "java.util.OptionalLong",
        "java.util.OptionalDouble",
    ] {
        duals.push(DualMethod::new(class, "isPresent", "isEmpty"));
    }
    for class in [
        "java.util.stream.Stream",
        "java.util.stream.IntStream",
        "java.util.stream.LongStream",
        "java.util.stream.DoubleStream",
    ] {
        duals.push(DualMethod::new(class, "anyMatch", "noneMatch"));
    }
    duals
}

pub fn default_exceptional_name_prefixes() -> Vec<String> {
    to_strings(&["assert", "check", "require"])
}

pub fn default_exceptional_classes() -> Vec<String> {
    to_strings(&["com.google.common.base.Preconditions", "org.junit.Assert"])
}

pub fn default_side_effect_free_classes() -> Vec<String> {
    to_strings(&[
        "java.lang.Object",
        "java.lang.String",
        "java.lang.StringBuilder",
        "java.lang.StringBuffer",
        "java.lang.Boolean",
        "java.lang.Byte",
        "java.lang.Character",
        "java.lang.Short",
        "java.lang.Integer",
        "java.lang.Long",
        "java.lang.Float",
        "java.lang.Double",
        "java.math.BigDecimal",
        "java.math.BigInteger",
        "java.util.ArrayList",
        "java.util.LinkedList",
        "java.util.ArrayDeque",
        "java.util.HashMap",
        "java.util.LinkedHashMap",
        "java.util.TreeMap",
        "java.util.HashSet",
        "java.util.LinkedHashSet",
        "java.util.TreeSet",
        "java.util.EnumMap",
        "java.util.IdentityHashMap",
        "java.util.WeakHashMap",
        "java.util.PriorityQueue",
        "java.util.Random",
        "java.util.StringJoiner",
        "java.util.concurrent.ConcurrentHashMap",
        "java.util.concurrent.CopyOnWriteArrayList",
        "java.util.concurrent.atomic.AtomicBoolean",
        "java.util.concurrent.atomic.AtomicInteger",
        "java.util.concurrent.atomic.AtomicLong",
        "java.util.concurrent.atomic.AtomicReference",
    ])
}

pub fn default_known_interfaces() -> Vec<String> {
    to_strings(&[
        "java.lang.Runnable",
        "java.lang.Comparable",
        "java.lang.Iterable",
        "java.lang.AutoCloseable",
        "java.util.Comparator",
        "java.util.Iterator",
        "java.util.concurrent.Callable",
        "java.util.function.Function",
        "java.util.function.BiFunction",
        "java.util.function.Supplier",
        "java.util.function.Consumer",
        "java.util.function.BiConsumer",
        "java.util.function.Predicate",
        "java.util.function.BiPredicate",
        "java.util.function.UnaryOperator",
        "java.util.function.BinaryOperator",
    ])
}

pub fn default_pure_methods() -> Vec<String> {
    to_strings(&[
        "java.lang.String#length",
        "java.lang.String#isEmpty",
        "java.lang.String#isBlank",
        "java.lang.String#charAt",
        "java.lang.String#codePointAt",
        "java.lang.String#equals",
        "java.lang.String#equalsIgnoreCase",
        "java.lang.String#compareTo",
        "java.lang.String#compareToIgnoreCase",
        "java.lang.String#contains",
        "java.lang.String#startsWith",
        "java.lang.String#endsWith",
        "java.lang.String#indexOf",
        "java.lang.String#lastIndexOf",
        "java.lang.String#substring",
        "java.lang.String#subSequence",
        "java.lang.String#concat",
        "java.lang.String#replace",
        "java.lang.String#replaceAll",
        "java.lang.String#replaceFirst",
        "java.lang.String#matches",
        "java.lang.String#split",
        "java.lang.String#join",
        "java.lang.String#toLowerCase",
        "java.lang.String#toUpperCase",
        "java.lang.String#trim",
        "java.lang.String#strip",
        "java.lang.String#stripLeading",
        "java.lang.String#stripTrailing",
        "java.lang.String#repeat",
        "java.lang.String#valueOf",
        "java.lang.String#format",
        "java.lang.String#hashCode",
        "java.lang.String#toString",
        "java.lang.String#toCharArray",
        "java.lang.Math#*",
        "java.lang.StrictMath#*",
        "java.lang.Boolean#*",
        "java.lang.Character#*",
        "java.lang.Integer#*",
        "java.lang.Long#*",
        "java.lang.Double#*",
        "java.lang.Float#*",
        "java.lang.Object#equals",
        "java.lang.Object#hashCode",
        "java.lang.Object#toString",
        "java.lang.Object#getClass",
        "java.util.Objects#equals",
        "java.util.Objects#hash",
        "java.util.Objects#hashCode",
        "java.util.Objects#isNull",
        "java.util.Objects#nonNull",
        "java.util.Objects#toString",
        "java.util.Optional#of",
        "java.util.Optional#ofNullable",
        "java.util.Optional#empty",
        "java.util.Optional#isPresent",
        "java.util.Optional#isEmpty",
        "java.util.Optional#get",
        "java.util.Optional#orElse",
        "java.util.Optional#equals",
        "java.util.Optional#hashCode",
        "java.util.Optional#toString",
        "java.util.Collection#size",
        "java.util.Collection#isEmpty",
        "java.util.Collection#contains",
        "java.util.List#size",
        "java.util.List#isEmpty",
        "java.util.List#contains",
        "java.util.List#get",
        "java.util.List#indexOf",
        "java.util.Set#size",
        "java.util.Set#isEmpty",
        "java.util.Set#contains",
        "java.util.Map#size",
        "java.util.Map#isEmpty",
        "java.util.Map#get",
        "java.util.Map#getOrDefault",
        "java.util.Map#containsKey",
        "java.util.Map#containsValue",
    ])
}

pub fn default_mutating_methods() -> Vec<String> {
    to_strings(&[
        "java.util.Collection#add",
        "java.util.Collection#addAll",
        "java.util.Collection#remove",
        "java.util.Collection#removeAll",
        "java.util.Collection#clear",
        "java.util.List#add",
        "java.util.List#addAll",
        "java.util.List#remove",
        "java.util.List#set",
        "java.util.List#clear",
        "java.util.List#sort",
        "java.util.Set#add",
        "java.util.Set#remove",
        "java.util.Set#clear",
        "java.util.Map#put",
        "java.util.Map#putAll",
        "java.util.Map#putIfAbsent",
        "java.util.Map#remove",
        "java.util.Map#clear",
        "java.util.Map#computeIfAbsent",
        "java.lang.StringBuilder#append",
        "java.lang.StringBuilder#insert",
        "java.lang.StringBuilder#delete",
        "java.lang.StringBuilder#setLength",
        "java.lang.StringBuilder#reverse",
        "java.io.PrintStream#print",
        "java.io.PrintStream#println",
        "java.io.PrintStream#printf",
        "java.lang.Math#random",
        "java.lang.StrictMath#random",
        "java.lang.Thread#start",
        "java.lang.Thread#sleep",
    ])
}

pub fn default_inheritor_search_limit() -> usize {
    10
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
