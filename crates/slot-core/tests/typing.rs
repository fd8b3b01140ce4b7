mod common;

use common::{check_insert, check_insert_existing, check_multi_insert};

#[test]
fn test_operators() {
    check_insert("aa", "{aa$}");
    check_insert("a+b", "{a}+{b$}");
    check_insert("a+b-c", "{a}+{b}-{c$}");
    check_insert("1++1", "{1}+{+1$}");
    check_insert("1<2&&3<=4&&5==6+8", "{1}<{2}&&{3}<={4}&&{5}=={6}+{8$}");
    check_insert("false!=!false", "{false}!={}!{false$}");
    check_insert("false!=!!!false", "{false}!={}!{}!{}!{false$}");
    check_insert("5==-6", "{5}=={-6$}");
    check_insert("5==--6", "{5}=={}-{-6$}");
    check_insert("5==----6", "{5}=={}-{}-{}-{-6$}");
    check_insert("a.b", "{a}.{b$}");
    check_insert("a..b", "{a}..{b$}");
    check_insert("y-1", "{y}-{1$}");
    check_insert("getY()*1", "{getY}_({})_{}*{1$}");
    check_insert("getY()-1", "{getY}_({})_{}-{1$}");
    check_insert("getY()+-1", "{getY}_({})_{}+{-1$}");
}

#[test]
fn test_range_after_call() {
    check_insert("s.length()..10", "{s}.{length}_({})_{}..{10$}");
    check_insert("s.length()", "{s}.{length}_({})_{$}");
    check_insert("s.length().", "{s}.{length}_({})_{}.{$}");
    check_insert("s.length()..", "{s}.{length}_({})_{}..{$}");
    check_insert("s.length()..1", "{s}.{length}_({})_{}..{1$}");
}

#[test]
fn test_new_keyword() {
    check_insert("newton", "{newton$}");
    check_insert("new ton", "{}new {ton$}");
}

#[test]
fn test_strings() {
    check_insert("\"hello\"", "{}_\"hello\"_{$}");
    // Without the closing quote the caret stays inside.
    check_insert("\"hello", "{}_\"hello$\"_{}");
    check_insert("\"hello\"+\"world\"", "{}_\"hello\"_{}+{}_\"world\"_{$}");
    check_insert(
        "\"hello\"+\"world\"+(5*6)",
        "{}_\"hello\"_{}+{}_\"world\"_{}+{}_({5}*{6})_{$}",
    );

    check_insert("\"\\\"\"", "{}_\"\\\"\"_{$}");
    check_insert("\"\\'\"", "{}_\"\\'\"_{$}");
    check_insert("\"'\"", "{}_\"'\"_{$}");

    check_insert("'a'", "{}_'a'_{$}");
    check_insert("'a", "{}_'a$'_{}");
    check_insert("'\\''", "{}_'\\''_{$}");
    check_insert("'\\\"'", "{}_'\\\"'_{$}");
    check_insert("'\"'", "{}_'\"'_{$}");

    check_insert(
        "c == '\\\\' || c == '\"' || c == '\\''",
        "{c}=={}_'\\\\'_{}||{c}=={}_'\"'_{}||{c}=={}_'\\''_{$}",
    );
}

#[test]
fn test_quote_added_later() {
    check_multi_insert("abc{\"}def", "{abc$def}", "{abc}_\"$\"_{def}");
    check_multi_insert("abc{\"}", "{abc$}", "{abc}_\"$\"_{}");
    check_multi_insert("{\"}def", "{$def}", "{}_\"$\"_{def}");
    check_multi_insert("abc{\"}.def", "{abc$}.{def}", "{abc}_\"$\"_{}.{def}");
    check_multi_insert("abc{\"}*def", "{abc$}*{def}", "{abc}_\"$\"_{}*{def}");
    check_multi_insert("abc{\"}def()", "{abc$def}_({})_{}", "{abc}_\"$\"_{def}_({})_{}");
    check_multi_insert("abc{\"}()", "{abc$}_({})_{}", "{abc}_\"$\"_{}_({})_{}");
}

#[test]
fn test_adjacent_strings() {
    check_insert_existing("$\"b\"", "\"a", "{}_\"a$\"_{}_\"b\"_{}");
    check_insert_existing("$\"b\"", "\"a\"", "{}_\"a\"_{$}_\"b\"_{}");
    check_insert_existing("\"a\"$", "\"b", "{}_\"a\"_{}_\"b$\"_{}");
}

#[test]
fn test_brackets() {
    check_insert("a+(b-c)", "{a}+{}_({b}-{c})_{$}");
    check_insert("a+(b-(c*d))", "{a}+{}_({b}-{}_({c}*{d})_{})_{$}");
    check_insert("(a+b", "{}_({a}+{b$})_{}");

    check_insert("(((", "{}_({}_({}_({$})_{})_{})_{}");
    check_insert("((()", "{}_({}_({}_({})_{$})_{})_{}");
    check_insert("((())", "{}_({}_({}_({})_{})_{$})_{}");
    check_insert("((()))", "{}_({}_({}_({})_{})_{})_{$}");

    check_insert("(a+(b*c)+d)", "{}_({a}+{}_({b}*{c})_{}+{d})_{$}");
    check_insert("a(bc)d", "{a}_({bc})_{d$}");

    check_multi_insert(
        "({(MyWorld)}getWorld()).getWidth()",
        "{}_({$getWorld}_({})_{})_{}.{getWidth}_({})_{}",
        "{}_({}_({MyWorld})_{$getWorld}_({})_{})_{}.{getWidth}_({})_{}",
    );
}

#[test]
fn test_floating_literals() {
    check_insert("1.0", "{1.0$}");
    check_insert("10.20", "{10.20$}");
    check_insert("a.0", "{a}.{0$}");
    check_insert("1.a", "{1.a$}");
    check_insert("x1.a", "{x1}.{a$}");
    check_insert("+1", "{+1$}");
    check_insert("+1.0", "{+1.0$}");
    check_insert("+1.0e5", "{+1.0e5$}");
    check_insert("+1.0e", "{+1.0e$}");
    check_insert("+1.0e+5", "{+1.0e+5$}");
    check_insert("+1.0e+5+6", "{+1.0e+5}+{6$}");
    check_insert("+1.0p+5", "{+1.0p}+{5$}");
    check_insert("3+1", "{3}+{1$}");
    check_insert("3+1.0", "{3}+{1.0$}");
    check_insert("3+1.0e5", "{3}+{1.0e5$}");
    check_insert("3+1.0e+5", "{3}+{1.0e+5$}");
    check_insert("3+1.0e+5+6", "{3}+{1.0e+5}+{6$}");
    check_insert("3+1.0p+5", "{3}+{1.0p}+{5$}");

    check_insert("+1+2+3", "{+1}+{2}+{3$}");
    check_insert("+1++2", "{+1}+{+2$}");
    check_insert("+1++2+3", "{+1}+{+2}+{3$}");
    check_insert("+1++2++3", "{+1}+{+2}+{+3$}");
    check_insert("++1++2++3", "{}+{+1}+{+2}+{+3$}");

    check_insert("1e6", "{1e6$}");
    check_insert("1e-6", "{1e-6$}");
    check_insert("10e20", "{10e20$}");
    check_insert("10e+20", "{10e+20$}");
    check_insert("10e-20", "{10e-20$}");

    check_insert("1.0.3", "{1.0}.{3$}");
    check_insert("1.0.3.4", "{1.0}.{3.4$}");
    check_insert("1.0.x3.4", "{1.0}.{x3}.{4$}");

    check_insert("1..0", "{1}..{0$}");
}

#[test]
fn test_sign_and_exponent_typed_later() {
    check_multi_insert("+{1}", "{}+{$}", "{+1$}");
    check_multi_insert("+{+1}", "{}+{$}", "{}+{+1$}");
    check_multi_insert("1++{2}", "{1}+{}+{$}", "{1}+{+2$}");

    check_multi_insert("{1}e-6", "{$e}-{6}", "{1$e-6}");
    check_multi_insert("1{e}-6", "{1$}-{6}", "{1e$-6}");
    check_multi_insert("1e{-}6", "{1e$6}", "{1e-$6}");
    check_multi_insert("1e-{6}", "{1e-$}", "{1e-6$}");

    check_multi_insert("{x}1e-6", "{$1e-6}", "{x$1e}-{6}");
    check_multi_insert("1{x}e-6", "{1$e-6}", "{1x$e}-{6}");
    check_multi_insert("1e{x}-6", "{1e$-6}", "{1ex$}-{6}");
    check_multi_insert("1e-{x}6", "{1e-$6}", "{1e-x$6}");
}

#[test]
fn test_dot() {
    check_insert(".", "{}.{$}");
    check_insert("0.", "{0.$}");
    check_insert("a.", "{a}.{$}");
    check_insert("foo()", "{foo}_({})_{$}");
    check_insert("foo().bar()", "{foo}_({})_{}.{bar}_({})_{$}");
    check_insert("foo+().", "{foo}+{}_({})_{}.{$}");
    check_insert("foo()0.", "{foo}_({})_{0.$}");

    check_multi_insert("foo(){.}a", "{foo}_({})_{$a}", "{foo}_({})_{}.{$a}");

    // A second dot typed in front of a literal's dot forms `..` with the caret past it.
    check_insert_existing("0$.", ".", "{0}..{$}");
    check_insert_existing("1$.5", ".", "{1}..{$5}");
    check_insert_existing("x+1$.5", ".", "{x}+{1}..{$5}");
}

#[test]
fn test_overtype() {
    // An opening bracket just before an existing one steps into it.
    check_insert_existing("$()", "move", "{move$}_({})_{}");
    check_insert_existing("move$()", "(", "{move}_({$})_{}");

    // Other operators never overtype.
    check_insert_existing("a$+z", "+", "{a}+{$}+{z}");
    check_insert_existing("a$+z", "+b", "{a}+{b$}+{z}");

    // A comma steps over an existing comma when the field after it is blank.
    check_insert_existing("a$,", ",", "{a},{$}");
    check_insert_existing("a$,b", ",", "{a},{$},{b}");
}

#[test]
fn test_semicolon_is_ignored() {
    check_insert(";", "{$}");
    check_insert("foo();", "{foo}_({})_{$}");
    check_insert("\";", "{}_\";$\"_{}");
}
