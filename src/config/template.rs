/// Generate the `Tildefile.toml` written by `tilde init`.
pub fn generate_init_template() -> String {
	r#"# tilde project configuration.
# `~name(args)` shorthand in preprocess files is expanded to `@include name(args);`
# before compiling, and `@include name(args);` is turned back into shorthand in
# postprocess files afterwards.

[compiler]
# Compiler binary, resolved on PATH unless absolute.
binary = "sass"
# Extra arguments placed before --style, the input and the output.
# args = ["--no-source-map"]

[clean]
paths = [".sass-cache"]

[watch]
debounce-ms = 200

[targets.theme]
input = "scss/theme.scss"
output = "css/theme.css"
# nested | expanded | compact | compressed
style = "expanded"
# cache-location = ".sass-cache/theme"
preprocess = ["scss/**/*.scss"]
# Mirror rewritten sources here (scss/a.scss -> build/scss/a.scss)
# instead of rewriting them in place.
# preprocess-dest = "build"
postprocess = []
# watch = ["scss/**/*.scss"]

# Custom rule tables replace the built-in ones.
# [[preprocess]]
# pattern = '~([a-z0-9_-]+)\(([^;{]*)\);'
# replacement = '@include ${1}(${2});'
"#
	.to_string()
}
