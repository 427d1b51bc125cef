use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Attribute, Data, DeriveInput, Expr, ExprArray, Fields, LitBool, LitStr, Meta, Token,
    parse_macro_input,
};

/// Defines a config type whose fields resolve lazily through adapters
///
/// ```ignore
/// define_config! {
///     #[config(adapters = [EnvAdapter::with_prefix("APP_")])]
///     #[derive(Debug)]
///     pub struct AppConfig {
///         #[field(name = "port", default = 8080, optional, transform = integer(false))]
///         pub port: u16,
///     }
/// }
/// ```
///
/// The struct is emitted without fields; every declared field becomes an
/// accessor method returning `Result<T, ConfigError>`. `load` and
/// `load_or_error` also convert every field to its declared type.
#[proc_macro]
pub fn define_config(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match generate_config(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn generate_config(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &input.ident;
    let vis = &input.vis;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "define_config! does not support generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "define_config! only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "define_config! only supports structs",
            ));
        }
    };

    let class_adapters = parse_struct_config(&input.attrs)?;

    let mut accessor_methods = Vec::new();
    let mut schema_fields = Vec::new();
    let mut load_checks = Vec::new();

    for field in fields {
        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };
        let field_vis = &field.vis;
        let field_type = &field.ty;
        let ident_str = field_ident.to_string();

        let config = parse_field_config(field)?;

        // Docs and lint attributes move onto the accessor method
        let method_attrs: Vec<&Attribute> = field
            .attrs
            .iter()
            .filter(|attr| {
                ["doc", "cfg", "allow", "deprecated"]
                    .iter()
                    .any(|kept| attr.path().is_ident(kept))
            })
            .collect();
        let cfg_attrs: Vec<&Attribute> = field
            .attrs
            .iter()
            .filter(|attr| attr.path().is_ident("cfg"))
            .collect();

        accessor_methods.push(quote! {
            #(#method_attrs)*
            #field_vis fn #field_ident(&self) -> ::core::result::Result<#field_type, ::config_resolvr::ConfigError> {
                <Self as ::config_resolvr::Configurable>::get(self, #ident_str)
            }
        });

        load_checks.push(quote! {
            #(#cfg_attrs)*
            if let ::core::result::Result::Err(error) = config.#field_ident() {
                errors.push(error);
            }
        });

        let name = &config.name;
        let optional = config.optional;
        let default_body = match &config.default {
            Some(default) => quote! { ::config_resolvr::Value::from(#default) },
            None => quote! { ::config_resolvr::Value::Null },
        };
        let transforms = &config.transforms;
        let validators = &config.validators;
        let adapters = &config.adapters;
        let configs = &config.configs;

        schema_fields.push(quote! {
            #(#cfg_attrs)*
            let schema = schema.field(
                ::config_resolvr::FieldBuilder::new(#ident_str, |_: &#struct_name| #default_body)
                    .name(#name)
                    .optional(#optional)
                    #(.transform(#transforms))*
                    #(.validate(#validators))*
                    #(.adapter(#adapters))*
                    #(.configure(#configs))*
            );
        });
    }

    let bind_adapters = match class_adapters {
        Some(array) => {
            let elems = array.elems.iter();
            quote! {
                ::core::option::Option::Some(::std::vec![
                    #(::config_resolvr::IntoAdapter::into_adapter(#elems)),*
                ])
            }
        }
        None => quote! { ::core::option::Option::None },
    };

    let struct_attrs: Vec<&Attribute> = input
        .attrs
        .iter()
        .filter(|attr| !attr.path().is_ident("config"))
        .collect();

    let struct_def = quote! {
        #(#struct_attrs)*
        #vis struct #struct_name;
    };

    let accessor_impl = quote! {
        impl #struct_name {
            #(#accessor_methods)*
        }
    };

    let configurable_impl = quote! {
        impl ::config_resolvr::Configurable for #struct_name {
            fn schema() -> &'static ::config_resolvr::Schema<Self> {
                static SCHEMA: ::std::sync::LazyLock<::config_resolvr::Schema<#struct_name>> =
                    ::std::sync::LazyLock::new(|| {
                        let schema = ::config_resolvr::Schema::new();
                        #(#schema_fields)*
                        if let ::core::result::Result::Err(error) = schema.bind(#bind_adapters) {
                            panic!("{}", ::config_resolvr::format_config_errors(&[error]));
                        }
                        schema
                    });
                &SCHEMA
            }

            fn instance() -> Self {
                #struct_name
            }

            fn load_or_error() -> ::core::result::Result<Self, ::std::vec::Vec<::config_resolvr::ConfigError>> {
                let config = Self::instance();
                let mut errors = ::std::vec::Vec::new();
                #(#load_checks)*
                if errors.is_empty() {
                    ::core::result::Result::Ok(config)
                } else {
                    ::core::result::Result::Err(errors)
                }
            }
        }
    };

    Ok(quote! {
        #struct_def
        #accessor_impl
        #configurable_impl
    })
}

/// Parse #[config(adapters = [...])] on the struct
fn parse_struct_config(attrs: &[Attribute]) -> syn::Result<Option<ExprArray>> {
    let Some(attr) = attrs.iter().find(|attr| attr.path().is_ident("config")) else {
        return Ok(None);
    };

    let mut adapters = None;
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("adapters") {
            let array: ExprArray = meta.value()?.parse()?;
            if array.elems.is_empty() {
                return Err(meta.error("adapters must list at least one adapter"));
            }
            adapters = Some(array);
            Ok(())
        } else {
            Err(meta.error("expected adapters = [...]"))
        }
    })?;

    Ok(adapters)
}

#[derive(Debug)]
struct FieldConfig {
    name: LitStr,
    default: Option<Expr>,
    optional: bool,
    transforms: Vec<Expr>,
    validators: Vec<Expr>,
    adapters: Vec<Expr>,
    configs: Vec<Expr>,
}

/// Parse #[field(name = "x", default = v, optional, transform = t, ...)] syntax
fn parse_field_config(field: &syn::Field) -> syn::Result<FieldConfig> {
    let field_attr = field
        .attrs
        .iter()
        .find(|attr| attr.path().is_ident("field"))
        .ok_or_else(|| {
            syn::Error::new_spanned(
                field,
                "field must have a #[field(name = \"...\")] attribute",
            )
        })?;

    let list = match &field_attr.meta {
        Meta::List(list) => list,
        _ => {
            return Err(syn::Error::new_spanned(
                field_attr,
                "field attribute must be a list: #[field(name = \"...\", ...)]",
            ));
        }
    };

    let mut name = None;
    let mut default = None;
    let mut optional = false;
    let mut transforms = Vec::new();
    let mut validators = Vec::new();
    let mut adapters = Vec::new();
    let mut configs = Vec::new();

    list.parse_nested_meta(|meta| {
        let key = meta
            .path
            .get_ident()
            .ok_or_else(|| meta.error("expected identifier"))?
            .to_string();

        match key.as_str() {
            "name" => {
                let value: LitStr = meta.value()?.parse()?;
                if value.value().trim().is_empty() {
                    return Err(syn::Error::new_spanned(value, "field name must not be empty"));
                }
                name = Some(value);
            }
            "optional" => {
                optional = if meta.input.peek(Token![=]) {
                    let value: LitBool = meta.value()?.parse()?;
                    value.value
                } else {
                    true
                };
            }
            "default" => default = Some(meta.value()?.parse()?),
            "transform" => transforms.push(meta.value()?.parse()?),
            "validate" => validators.push(meta.value()?.parse()?),
            "adapter" => adapters.push(meta.value()?.parse()?),
            "configure" => configs.push(meta.value()?.parse()?),
            _ => {
                return Err(meta.error(
                    "expected one of: name, default, optional, transform, validate, adapter, configure",
                ));
            }
        }
        Ok(())
    })?;

    let name = name.ok_or_else(|| {
        syn::Error::new_spanned(field_attr, "field must have name = \"FIELD_NAME\"")
    })?;

    Ok(FieldConfig {
        name,
        default,
        optional,
        transforms,
        validators,
        adapters,
        configs,
    })
}
