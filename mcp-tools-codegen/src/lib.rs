use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Expr, ExprLit, ItemFn, Lit, MetaNameValue, Token, parse::Parser, parse_macro_input,
    punctuated::Punctuated,
};

const TOOL_PREFIXES: &[&str] = &["azure_", "ado_", "fabric_"];
const UNPREFIXED_TOOLS: &[&str] = &["get_current_user", "show_agent_instructions"];

/// Attribute macro to mark a function as an MCP tool.
///
/// The tool name must carry one of the platform prefixes (`azure_`, `ado_`,
/// `fabric_`) unless it is one of the general identity tools. The function is
/// emitted unchanged, together with `TOOL_NAME` and `TOOL_DESCRIPTION`
/// constants in the enclosing module, so each tool lives in its own file.
///
/// Usage:
/// ```rust,ignore
/// #[mcp_tool(
///     name = "azure_check_resource",
///     description = "Check which resources of a type exist in a resource group"
/// )]
/// pub async fn check_resource(
///     client: &OpsClient,
///     args: CheckResourceArgs,
/// ) -> Result<CallToolResult, McpError> {
///     // implementation
/// }
/// ```
#[proc_macro_attribute]
pub fn mcp_tool(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input_fn = parse_macro_input!(item as ItemFn);

    let pairs = match Punctuated::<MetaNameValue, Token![,]>::parse_terminated.parse(attr) {
        Ok(pairs) => pairs,
        Err(err) => return err.to_compile_error().into(),
    };

    let mut name = None;
    let mut description = None;
    for pair in pairs {
        let value = match &pair.value {
            Expr::Lit(ExprLit {
                lit: Lit::Str(s), ..
            }) => s.value(),
            other => {
                return syn::Error::new_spanned(other, "expected a string literal")
                    .to_compile_error()
                    .into();
            }
        };
        if pair.path.is_ident("name") {
            name = Some((value, pair.path.clone()));
        } else if pair.path.is_ident("description") {
            description = Some(value);
        } else {
            return syn::Error::new_spanned(&pair.path, "unknown mcp_tool key")
                .to_compile_error()
                .into();
        }
    }

    let (Some((name, name_path)), Some(description)) = (name, description) else {
        return syn::Error::new_spanned(
            &input_fn.sig.ident,
            "mcp_tool attribute requires both 'name' and 'description' parameters",
        )
        .to_compile_error()
        .into();
    };

    if !TOOL_PREFIXES.iter().any(|p| name.starts_with(p))
        && !UNPREFIXED_TOOLS.contains(&name.as_str())
    {
        return syn::Error::new_spanned(
            name_path,
            format!(
                "tool name '{}' must start with one of {:?}",
                name, TOOL_PREFIXES
            ),
        )
        .to_compile_error()
        .into();
    }

    if description.trim().is_empty() {
        return syn::Error::new_spanned(&input_fn.sig.ident, "tool description cannot be empty")
            .to_compile_error()
            .into();
    }

    TokenStream::from(quote! {
        pub const TOOL_NAME: &str = #name;
        pub const TOOL_DESCRIPTION: &str = #description;

        #input_fn
    })
}
