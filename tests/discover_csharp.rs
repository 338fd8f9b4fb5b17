use urlaction::csharp::graph_from_source;
use urlaction::discover::{DiscoveryOptions, Discoverer, discover};
use urlaction::model::AreaModel;
use urlaction::symbols::Constant;

fn areas_for(source: &str) -> Vec<AreaModel> {
    let graph = graph_from_source(source).unwrap();
    discover(&graph).unwrap()
}

#[test]
fn no_controller_no_area() {
    let areas = areas_for(
        r#"
using Microsoft.AspNetCore.Mvc;

namespace TestCode
{
    public class HomeController
    {
        public IActionResult Index()
        {
            return View();
        }
    }
}"#,
    );
    assert!(areas.is_empty());
}

#[test]
fn single_controller_no_area() {
    let areas = areas_for(
        r#"
using Microsoft.AspNetCore.Mvc;

namespace TestCode
{
    public class HomeController : Controller
    {
        public IActionResult Index()
        {
            return View();
        }
    }
}"#,
    );
    assert_eq!(areas.len(), 1);
    assert_eq!(areas[0].name, "");
    assert_eq!(areas[0].controllers.len(), 1);
    let home = &areas[0].controllers[0];
    assert_eq!(home.name, "Home");
    assert_eq!(home.actions.len(), 1);
    assert_eq!(home.actions[0].name, "Index");
    assert!(home.actions[0].parameters.is_empty());
}

#[test]
fn multi_controller_no_area() {
    let areas = areas_for(
        r#"
using Microsoft.AspNetCore.Mvc;

namespace TestCode
{
    public class HomeController : Controller
    {
        public IActionResult Index()
        {
            return View();
        }
    }

    public class ContactController : Controller
    {
        public IActionResult Index()
        {
            return View();
        }
    }
}"#,
    );
    assert_eq!(areas.len(), 1);
    assert_eq!(areas[0].name, "");
    assert_eq!(areas[0].controllers.len(), 2);
    assert_eq!(areas[0].controllers[0].name, "Home");
    assert_eq!(areas[0].controllers[1].name, "Contact");
    for controller in &areas[0].controllers {
        assert_eq!(controller.actions.len(), 1);
        assert_eq!(controller.actions[0].name, "Index");
        assert!(controller.actions[0].parameters.is_empty());
    }
}

#[test]
fn async_action_drops_suffix() {
    let areas = areas_for(
        r#"
using System.Threading.Tasks;
using Microsoft.AspNetCore.Mvc;

namespace TestCode
{
    public class HomeController : Controller
    {
        public async Task<IActionResult> IndexAsync()
        {
            return View();
        }
    }
}"#,
    );
    assert_eq!(areas.len(), 1);
    assert_eq!(areas[0].controllers[0].actions[0].name, "Index");
}

#[test]
fn controller_in_area() {
    let areas = areas_for(
        r#"
using System.Threading.Tasks;
using Microsoft.AspNetCore.Mvc;

namespace TestCode
{
    [Area("Admin")]
    public class HomeController : Controller
    {
        public IActionResult Index()
        {
            return View();
        }
    }
}"#,
    );
    assert_eq!(areas.len(), 1);
    assert_eq!(areas[0].name, "Admin");
    assert_eq!(areas[0].controllers[0].name, "Home");
    assert_eq!(areas[0].controllers[0].actions[0].name, "Index");
}

#[test]
fn action_parameters() {
    let areas = areas_for(
        r#"
using Microsoft.AspNetCore.Mvc;

namespace TestCode
{
    public class HomeController : Controller
    {
        public IActionResult Index(string search, int page)
        {
            return View();
        }
    }
}"#,
    );
    let params = &areas[0].controllers[0].actions[0].parameters;
    assert_eq!(params.len(), 2);
    assert_eq!(params[0].name, "search");
    assert_eq!(params[0].ty, "string");
    assert!(!params[0].has_default_value);
    assert_eq!(params[0].default_value, None);
    assert_eq!(params[1].name, "page");
    assert_eq!(params[1].ty, "int");
    assert!(!params[1].has_default_value);
    assert_eq!(params[1].default_value, None);
}

#[test]
fn action_parameter_defaults() {
    let areas = areas_for(
        r#"
using Microsoft.AspNetCore.Mvc;

namespace TestCode
{
    public class HomeController : Controller
    {
        public IActionResult Index(string search = "", int page = 1)
        {
            return View();
        }
    }
}"#,
    );
    let params = &areas[0].controllers[0].actions[0].parameters;
    assert_eq!(params.len(), 2);
    assert_eq!(params[0].ty, "string");
    assert!(params[0].has_default_value);
    assert_eq!(params[0].default_value, Some(Constant::String(String::new())));
    assert_eq!(params[1].ty, "int");
    assert!(params[1].has_default_value);
    assert_eq!(params[1].default_value, Some(Constant::Int(1)));
}

#[test]
fn generic_parameter_uses_full_names() {
    let areas = areas_for(
        r#"
using System.Collections.Generic;
using Microsoft.AspNetCore.Mvc;

namespace TestCode
{
    public class HomeController : Controller
    {
        public IActionResult Index(List<Dictionary<string, string>> parameter)
        {
            return View();
        }
    }
}"#,
    );
    let params = &areas[0].controllers[0].actions[0].parameters;
    assert_eq!(params.len(), 1);
    assert_eq!(params[0].name, "parameter");
    assert_eq!(
        params[0].ty,
        "System.Collections.Generic.List<System.Collections.Generic.Dictionary<string, string>>"
    );
    assert!(!params[0].has_default_value);
}

#[test]
fn array_parameter() {
    let areas = areas_for(
        r#"
using Microsoft.AspNetCore.Mvc;

namespace TestCode
{
    public class HomeController : Controller
    {
        public IActionResult Index(string[] strings)
        {
            return View();
        }
    }
}"#,
    );
    let params = &areas[0].controllers[0].actions[0].parameters;
    assert_eq!(params[0].name, "strings");
    assert_eq!(params[0].ty, "string[]");
}

#[test]
fn non_action_is_excluded() {
    let areas = areas_for(
        r#"
using Microsoft.AspNetCore.Mvc;

namespace TestCode
{
    public class HomeController : Controller
    {
        [NonAction]
        public IActionResult Index(string[] strings)
        {
            return View();
        }
    }
}"#,
    );
    assert!(areas.is_empty());
}

#[test]
fn mixed_areas_keep_first_seen_order() {
    let areas = areas_for(
        r#"
using Microsoft.AspNetCore.Mvc;

namespace TestCode
{
    [Area("Admin")]
    public class UsersController : Controller
    {
        public IActionResult List() => View();
    }

    public class HomeController : Controller
    {
        public IActionResult Index() => View();
    }

    [Area("Admin")]
    public class RolesController : ControllerBase
    {
        public IActionResult List() => Ok();
    }
}"#,
    );
    let names: Vec<_> = areas.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Admin", ""]);
    let admin: Vec<_> = areas[0].controllers.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(admin, vec!["Users", "Roles"]);
}

#[test]
fn inherited_base_and_abstract_policy() {
    let source = r#"
using Microsoft.AspNetCore.Mvc;

namespace TestCode
{
    public abstract class AppController : Controller
    {
        public IActionResult Ping() => Ok();
    }

    public class OrdersController : AppController
    {
        public IActionResult Details(int id) => View();
        protected IActionResult Helper() => View();
        public OrdersController() { }
    }
}"#;
    let graph = graph_from_source(source).unwrap();
    let areas = discover(&graph).unwrap();
    assert_eq!(areas[0].controllers.len(), 1);
    let orders = &areas[0].controllers[0];
    assert_eq!(orders.name, "Orders");
    let actions: Vec<_> = orders.actions.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(actions, vec!["Details"]);

    let including = Discoverer::new(DiscoveryOptions {
        skip_abstract: false,
        ..DiscoveryOptions::default()
    });
    let areas = including.discover(&graph).unwrap();
    let names: Vec<_> = areas[0].controllers.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["App", "Orders"]);
}

#[test]
fn richer_parameter_shapes() {
    let areas = areas_for(
        r#"
using System;
using System.Threading;
using Microsoft.AspNetCore.Mvc;

namespace TestCode
{
    public class SearchController : Controller
    {
        public IActionResult Query(
            Guid id,
            int? page = null,
            double ratio = 1,
            bool exact = false,
            char sep = ',',
            String label = @"a""b",
            long offset = -5,
            SortOrder order = SortOrder.Asc,
            int[,] grid = null,
            CancellationToken token = default)
        {
            return View();
        }
    }

    public enum SortOrder { Asc, Desc }
}"#,
    );
    let params = &areas[0].controllers[0].actions[0].parameters;
    let types: Vec<_> = params.iter().map(|p| p.ty.as_str()).collect();
    assert_eq!(
        types,
        vec![
            "System.Guid",
            "int?",
            "double",
            "bool",
            "char",
            "string",
            "long",
            "TestCode.SortOrder",
            "int[,]",
            "System.Threading.CancellationToken",
        ]
    );
    assert_eq!(params[1].default_value, Some(Constant::Null));
    assert_eq!(params[2].default_value, Some(Constant::Float(1.0)));
    assert_eq!(params[3].default_value, Some(Constant::Bool(false)));
    assert_eq!(params[4].default_value, Some(Constant::Char(',')));
    assert_eq!(params[5].default_value, Some(Constant::String("a\"b".to_string())));
    assert_eq!(params[6].default_value, Some(Constant::Int(-5)));
    // Enum members and `default` need semantic evaluation.
    assert!(!params[7].has_default_value);
    assert!(!params[9].has_default_value);
}

#[test]
fn params_array_is_a_parameter() {
    let areas = areas_for(
        r#"
using Microsoft.AspNetCore.Mvc;

namespace TestCode
{
    public class HomeController : Controller
    {
        public IActionResult Index([FromQuery] string q, params string[] tags)
        {
            return View();
        }
    }
}"#,
    );
    let params = &areas[0].controllers[0].actions[0].parameters;
    assert_eq!(params.len(), 2);
    assert_eq!(params[0].name, "q");
    assert_eq!(params[0].ty, "string");
    assert_eq!(params[1].name, "tags");
    assert_eq!(params[1].ty, "string[]");
    assert!(!params[1].has_default_value);
}

#[test]
fn method_targeted_non_action_is_excluded() {
    let areas = areas_for(
        r#"
using Microsoft.AspNetCore.Mvc;

namespace TestCode
{
    public class HomeController : Controller
    {
        [method: NonAction]
        public IActionResult Secret() => View();

        [return: NotNull]
        public IActionResult Index() => View();
    }
}"#,
    );
    let actions: Vec<_> = areas[0].controllers[0]
        .actions
        .iter()
        .map(|a| a.name.as_str())
        .collect();
    assert_eq!(actions, vec!["Index"]);
}

#[test]
fn type_targeted_area_applies() {
    let areas = areas_for(
        r#"
using Microsoft.AspNetCore.Mvc;

namespace TestCode
{
    [type: Area("Admin")]
    public class HomeController : Controller
    {
        public IActionResult Index() => View();
    }
}"#,
    );
    assert_eq!(areas.len(), 1);
    assert_eq!(areas[0].name, "Admin");
}

#[test]
fn generic_methods_are_not_actions() {
    let areas = areas_for(
        r#"
using Microsoft.AspNetCore.Mvc;

namespace TestCode
{
    public class HomeController : Controller
    {
        public IActionResult Go<T>() => View();
        public IActionResult Index() => View();
    }
}"#,
    );
    let actions: Vec<_> = areas[0].controllers[0]
        .actions
        .iter()
        .map(|a| a.name.as_str())
        .collect();
    assert_eq!(actions, vec!["Index"]);
}
