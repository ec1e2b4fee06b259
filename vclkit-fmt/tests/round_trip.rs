//! Formatting a file must keep its meaning and its comments, and
//! formatting the result again must not change it.

use vclkit_core::StyleConfig;
use vclkit_fmt::format_source;
use vclkit_syntax::{parse, tokenize, Token};

/// Already in canonical form
const CANONICAL: &str = r#"# Service configuration
import boltsort;
include "shared";

acl internal {
  "192.168.0.0"/16;
  !"192.168.0.1"; // gateway
  # office
  "10.0.0.1";
}

table redirects STRING {
  "/old": "/new",
  "/legacy": "/current", // moved in 2023
}

backend F_origin {
  .host = "origin.example.com";
  .port = "443";
  .probe = {
    .request = "HEAD / HTTP/1.1" "Host: origin.example.com";
    .threshold = 1;
  }
}

/* Entry point */
sub vcl_recv {
  #FASTLY recv
  declare local var.path STRING;
  set var.path = regsub(req.url.path, "/+$", "");
  set req.http.X-Id = uuid.version4();
  set req.http.Foo = if (req.http.Host, "example.com", "foobar");
  set req.http.Debug = {"foo bar"} if (req.http.Host, "a", "b") {"baz"};
  set req.http.Count += "1";
  if (client.ip ~ internal && req.http.Debug /* only internal */) {
    set req.http.X-Internal = "1";
  } elsif (req.http.Cookie ~ "session=") {
    unset req.http.Cookie;
  }
  // last resort
  else {
    error 403 "Forbidden";
  }
  switch (req.http.Host) {
    case "a.example.com":
      set req.backend = F_origin;
      break;
    case ~ "^b\.":
      fallthrough;
    default:
      esi;
      break;
  }
  if (table.lookup(redirects, var.path)) {
    error 801 table.lookup(redirects, var.path);
  }
  goto done;
  done:
  return (lookup);
}

sub vcl_error {
  if (obj.status == 801) {
    set obj.status = 301;
    set obj.http.Location = "https://" req.http.Host obj.response;
    synthetic {""};
    return (deliver);
  }
  # unreachable in practice
}
# end of file
"#;

/// The same program written carelessly
const MESSY: &str = r#"# Service configuration
import   boltsort ;
include "shared";
acl internal { "192.168.0.0"/16; !"192.168.0.1"; // gateway
# office
"10.0.0.1"; }
table redirects STRING { "/old":"/new", "/legacy":"/current" // moved in 2023
}
backend F_origin {.host="origin.example.com";.port="443";
    .probe={.request="HEAD / HTTP/1.1" "Host: origin.example.com";.threshold=1;};
}
/* Entry point */
sub vcl_recv{
#FASTLY recv
declare local var.path STRING;
set var.path=regsub(req.url.path,"/+$","");
set req.http.X-Id=uuid.version4( );
set req.http.Foo=if(req.http.Host,"example.com","foobar");
set req.http.Debug={"foo bar"}if(req.http.Host,"a","b"){"baz"};
set req.http.Count+="1";
if(client.ip~internal&&req.http.Debug/* only internal */){set req.http.X-Internal="1";}
elsif(req.http.Cookie~"session="){unset req.http.Cookie;}
// last resort
else{error 403 "Forbidden";}
switch(req.http.Host){
case "a.example.com":
set req.backend=F_origin;
break;
case ~ "^b\.":
fallthrough;
default:
esi;
break;
}
if(table.lookup(redirects,var.path)){error 801 table.lookup(redirects,var.path);}
goto done;
done:
return(lookup);
}
sub vcl_error{
if(obj.status==801){
set obj.status=301;
set obj.http.Location="https://" req.http.Host obj.response;
synthetic {""};
return(deliver);
}
# unreachable in practice
}
# end of file"#;

fn comments(source: &str) -> Vec<String> {
    let mut comments: Vec<String> = tokenize(source)
        .unwrap()
        .into_iter()
        .filter_map(|token| match token.value {
            Token::LineComment(text) | Token::BlockComment(text) => Some(text),
            _ => None,
        })
        .collect();
    comments.sort();
    comments
}

fn assert_round_trip(source: &str, conf: &StyleConfig) -> String {
    let once = format_source(source, conf).unwrap();
    let twice = format_source(&once, conf).unwrap();
    assert_eq!(once, twice, "formatting is not idempotent");
    assert_eq!(comments(source), comments(&once), "comments changed");
    once
}

#[test]
fn test_canonical_is_unchanged() {
    let formatted = assert_round_trip(CANONICAL, &StyleConfig::default());
    assert_eq!(formatted, CANONICAL);
}

#[test]
fn test_messy_formats_to_canonical() {
    let formatted = assert_round_trip(MESSY, &StyleConfig::default());
    assert_eq!(formatted, CANONICAL);
}

#[test]
fn test_structure_survives_formatting() {
    for source in [CANONICAL, MESSY] {
        let formatted = format_source(source, &StyleConfig::default()).unwrap();
        assert_eq!(parse(source).unwrap(), parse(&formatted).unwrap());
    }
}

#[test]
fn test_every_style_round_trips() {
    let styles = [
        "ElseIf=true",
        "ReturnArgumentParenthesis=true",
        "IndentWidth=4",
        "IndentStyle=tab",
    ];
    for style in styles {
        let mut conf = StyleConfig::default();
        conf.apply_override(style).unwrap();
        assert_round_trip(MESSY, &conf);
    }
}

#[test]
fn test_else_if_option() {
    let source = "if (a) {\n  esi;\n} elseif (b) {\n  esi;\n} elsif (c) {\n  esi;\n} else if (d) {\n  esi;\n}\n";
    assert_eq!(assert_round_trip(source, &StyleConfig::default()), source);

    let mut conf = StyleConfig::default();
    conf.else_if = true;
    assert_eq!(
        assert_round_trip(source, &conf),
        "if (a) {\n  esi;\n} else if (b) {\n  esi;\n} else if (c) {\n  esi;\n} else if (d) {\n  esi;\n}\n"
    );
}

#[test]
fn test_comments_between_branches() {
    let source = "if (a) {\n  esi;\n} # first\n/* second */ else {\n  restart;\n}\n";
    assert_eq!(
        assert_round_trip(source, &StyleConfig::default()),
        "if (a) {\n  esi;\n}\n# first\n/* second */\nelse {\n  restart;\n}\n"
    );
}

#[test]
fn test_switch_terminators() {
    let source = "switch (req.http.A) {\ncase \"x\": esi; break; // done\ncase \"y\": /* next */ fallthrough;\ndefault: restart;\n}";
    assert_eq!(
        assert_round_trip(source, &StyleConfig::default()),
        "switch (req.http.A) {\n  case \"x\":\n    esi;\n    break; // done\n  case \"y\": /* next */\n    fallthrough;\n  default:\n    restart;\n}\n"
    );
}

#[test]
fn test_return_parenthesis_option() {
    let source = "sub compute INTEGER {\n  return 1;\n}\n";
    assert_eq!(assert_round_trip(source, &StyleConfig::default()), source);

    let mut conf = StyleConfig::default();
    conf.return_argument_parenthesis = true;
    assert_eq!(
        assert_round_trip(source, &conf),
        "sub compute INTEGER {\n  return (1);\n}\n"
    );
}

#[test]
fn test_style_keeps_structure() {
    let mut conf = StyleConfig::default();
    conf.return_argument_parenthesis = true;
    let source = "sub vcl_recv {\n  return pass;\n}\n";
    let formatted = format_source(source, &conf).unwrap();
    assert_eq!(formatted, "sub vcl_recv {\n  return (pass);\n}\n");
    assert_eq!(parse(source).unwrap(), parse(&formatted).unwrap());

    assert_eq!(
        parse("log \"a\" + \"b\";").unwrap(),
        parse("log \"a\" \"b\";").unwrap()
    );
}

#[test]
fn test_parse_error_is_reported() {
    assert!(format_source("sub vcl_recv { set req.http.A = ; }", &StyleConfig::default()).is_err());
}
